//! Reconciliation anomalies.
//!
//! An anomaly is raised when a fulfillment claim arrives for a pair that is
//! already enrolled and the claim disagrees with the stored row. The stored
//! row always wins; the anomaly goes to a review queue.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, StudentId, Timestamp};

use super::Enrollment;

/// Shape of the disagreement between the stored row and the new claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Payment arrived for a course the student already had for free.
    PaidOverFree,
    /// Free claim against an existing paid enrollment.
    FreeOverPaid,
    /// A second, different payment for an already paid enrollment.
    DuplicatePayment,
    /// Same payment reference, different amount.
    AmountMismatch,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::PaidOverFree => "paid_over_free",
            AnomalyKind::FreeOverPaid => "free_over_paid",
            AnomalyKind::DuplicatePayment => "duplicate_payment",
            AnomalyKind::AmountMismatch => "amount_mismatch",
        }
    }
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A claim that conflicts with an existing enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationAnomaly {
    pub kind: AnomalyKind,
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub existing_payment_id: String,
    pub existing_amount: Decimal,
    pub claimed_payment_id: String,
    pub claimed_amount: Decimal,
    pub detected_at: Timestamp,
}

impl ReconciliationAnomaly {
    /// Compares a claim against the stored row.
    ///
    /// Returns `None` for plain duplicates (same reference, same amount) and
    /// for zero-amount claims against an existing free row.
    pub fn detect(
        existing: &Enrollment,
        claimed_payment_id: &str,
        claimed_amount: Decimal,
    ) -> Option<Self> {
        let claimed_free = claimed_amount.is_zero();

        let kind = if existing.payment_id() == claimed_payment_id {
            if existing.amount() == claimed_amount {
                return None;
            }
            AnomalyKind::AmountMismatch
        } else {
            match (existing.is_free(), claimed_free) {
                (true, true) => return None,
                (true, false) => AnomalyKind::PaidOverFree,
                (false, true) => AnomalyKind::FreeOverPaid,
                (false, false) => AnomalyKind::DuplicatePayment,
            }
        };

        Some(Self {
            kind,
            student_id: existing.student_id(),
            course_id: existing.course_id(),
            existing_payment_id: existing.payment_id().to_string(),
            existing_amount: existing.amount(),
            claimed_payment_id: claimed_payment_id.to_string(),
            claimed_amount,
            detected_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrollment::FREE_PAYMENT_ID;
    use rust_decimal_macros::dec;

    fn paid() -> Enrollment {
        Enrollment::new(StudentId::new(), CourseId::new(), "cs_first", dec!(49.99)).unwrap()
    }

    fn free() -> Enrollment {
        Enrollment::new(StudentId::new(), CourseId::new(), FREE_PAYMENT_ID, Decimal::ZERO).unwrap()
    }

    #[test]
    fn identical_claim_is_not_an_anomaly() {
        assert!(ReconciliationAnomaly::detect(&paid(), "cs_first", dec!(49.99)).is_none());
    }

    #[test]
    fn same_reference_different_amount_is_mismatch() {
        let a = ReconciliationAnomaly::detect(&paid(), "cs_first", dec!(39.99)).unwrap();
        assert_eq!(a.kind, AnomalyKind::AmountMismatch);
    }

    #[test]
    fn payment_over_free_enrollment_is_flagged() {
        let a = ReconciliationAnomaly::detect(&free(), "cs_late", dec!(49.99)).unwrap();
        assert_eq!(a.kind, AnomalyKind::PaidOverFree);
        assert_eq!(a.existing_payment_id, FREE_PAYMENT_ID);
        assert_eq!(a.claimed_payment_id, "cs_late");
    }

    #[test]
    fn free_claim_over_paid_enrollment_is_flagged() {
        let a = ReconciliationAnomaly::detect(&paid(), FREE_PAYMENT_ID, Decimal::ZERO).unwrap();
        assert_eq!(a.kind, AnomalyKind::FreeOverPaid);
    }

    #[test]
    fn second_payment_is_duplicate() {
        let a = ReconciliationAnomaly::detect(&paid(), "cs_second", dec!(49.99)).unwrap();
        assert_eq!(a.kind, AnomalyKind::DuplicatePayment);
    }

    #[test]
    fn zero_amount_claim_over_free_row_is_ignored() {
        assert!(ReconciliationAnomaly::detect(&free(), "cs_coupon", Decimal::ZERO).is_none());
    }
}
