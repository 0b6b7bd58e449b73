//! Enrollment aggregate entity.
//!
//! An enrollment is a student's confirmed right to access a course.
//!
//! # Invariants
//!
//! - At most one enrollment per `(student_id, course_id)`, enforced by the store
//! - `is_free == (amount == 0)`, derived here and never supplied by callers
//! - Immutable once created: no setters, no soft-delete

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, EnrollmentId, StudentId, Timestamp, ValidationError};

use super::money::normalize_amount;

/// Payment reference recorded for enrollments that involved no payment.
pub const FREE_PAYMENT_ID: &str = "free";

/// A confirmed enrollment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    id: EnrollmentId,
    student_id: StudentId,
    course_id: CourseId,
    payment_id: String,
    amount: Decimal,
    is_free: bool,
    enrolled_at: Timestamp,
}

impl Enrollment {
    /// Builds a new enrollment, validating the payment reference and amount.
    ///
    /// The amount is normalized to two decimal places. The `"free"` sentinel
    /// is only accepted together with a zero amount.
    pub fn new(
        student_id: StudentId,
        course_id: CourseId,
        payment_id: impl Into<String>,
        amount: Decimal,
    ) -> Result<Self, ValidationError> {
        let payment_id = payment_id.into();
        let amount = validate_fulfillment(&payment_id, amount)?;

        Ok(Self {
            id: EnrollmentId::new(),
            student_id,
            course_id,
            payment_id,
            is_free: amount.is_zero(),
            amount,
            enrolled_at: Timestamp::now(),
        })
    }

    /// Rebuilds an enrollment loaded from storage.
    ///
    /// `is_free` is recomputed from the amount rather than trusted.
    pub fn reconstitute(
        id: EnrollmentId,
        student_id: StudentId,
        course_id: CourseId,
        payment_id: String,
        amount: Decimal,
        enrolled_at: Timestamp,
    ) -> Self {
        Self {
            id,
            student_id,
            course_id,
            payment_id,
            is_free: amount.is_zero(),
            amount,
            enrolled_at,
        }
    }

    pub fn id(&self) -> EnrollmentId {
        self.id
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn course_id(&self) -> CourseId {
        self.course_id
    }

    pub fn payment_id(&self) -> &str {
        &self.payment_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn is_free(&self) -> bool {
        self.is_free
    }

    pub fn enrolled_at(&self) -> Timestamp {
        self.enrolled_at
    }

    /// True if this row was created without a provider payment.
    ///
    /// Such rows are exempt from payment reference uniqueness.
    pub fn has_free_reference(&self) -> bool {
        self.payment_id == FREE_PAYMENT_ID
    }
}

/// Checks the payment reference and amount of a fulfillment request.
///
/// Returns the normalized amount on success.
pub fn validate_fulfillment(payment_id: &str, amount: Decimal) -> Result<Decimal, ValidationError> {
    if payment_id.trim().is_empty() {
        return Err(ValidationError::empty_field("payment_id"));
    }
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::negative("amount", amount));
    }
    let amount = normalize_amount(amount);
    if payment_id == FREE_PAYMENT_ID && !amount.is_zero() {
        return Err(ValidationError::invalid_format(
            "payment_id",
            "the free sentinel requires a zero amount",
        ));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ids() -> (StudentId, CourseId) {
        (StudentId::new(), CourseId::new())
    }

    #[test]
    fn paid_enrollment_is_not_free() {
        let (s, c) = ids();
        let e = Enrollment::new(s, c, "cs_test_123", dec!(49.99)).unwrap();
        assert!(!e.is_free());
        assert_eq!(e.amount(), dec!(49.99));
        assert_eq!(e.payment_id(), "cs_test_123");
    }

    #[test]
    fn zero_amount_is_free() {
        let (s, c) = ids();
        let e = Enrollment::new(s, c, FREE_PAYMENT_ID, Decimal::ZERO).unwrap();
        assert!(e.is_free());
        assert!(e.has_free_reference());
    }

    #[test]
    fn zero_amount_with_provider_reference_is_still_free() {
        let (s, c) = ids();
        let e = Enrollment::new(s, c, "cs_test_coupon", dec!(0.00)).unwrap();
        assert!(e.is_free());
        assert!(!e.has_free_reference());
    }

    #[test]
    fn empty_payment_id_is_rejected() {
        let (s, c) = ids();
        let err = Enrollment::new(s, c, "  ", dec!(10)).unwrap_err();
        assert_eq!(err, ValidationError::empty_field("payment_id"));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let (s, c) = ids();
        let err = Enrollment::new(s, c, "cs_1", dec!(-0.01)).unwrap_err();
        assert_eq!(err.field(), "amount");
    }

    #[test]
    fn free_sentinel_with_positive_amount_is_rejected() {
        let (s, c) = ids();
        let err = Enrollment::new(s, c, FREE_PAYMENT_ID, dec!(5)).unwrap_err();
        assert_eq!(err.field(), "payment_id");
    }

    #[test]
    fn amount_is_normalized_to_cents() {
        let (s, c) = ids();
        let e = Enrollment::new(s, c, "cs_1", dec!(10.005)).unwrap();
        assert_eq!(e.amount(), dec!(10.01));
    }

    #[test]
    fn reconstitute_derives_is_free_from_amount() {
        let (s, c) = ids();
        let e = Enrollment::reconstitute(
            EnrollmentId::new(),
            s,
            c,
            "cs_1".to_string(),
            dec!(0.00),
            Timestamp::now(),
        );
        assert!(e.is_free());
    }
}
