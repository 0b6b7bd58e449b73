//! EnrollmentStore port - durable enrollment records.
//!
//! The store is the only shared mutable resource in the system. Its
//! uniqueness constraints, not in-process locks, are what keep two racing
//! fulfillment paths from creating two rows.
//!
//! # Constraints implementations must enforce
//!
//! - `(student_id, course_id)` is unique
//! - `payment_id` is unique among rows whose reference is not `"free"`
//! - rows are never updated or deleted through this port

use async_trait::async_trait;

use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{CourseId, DomainError, StudentId};

/// Result of an atomic insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was written by this call.
    Created(Enrollment),
    /// A row for the pair already existed; it is returned unchanged.
    Existing(Enrollment),
}

impl InsertOutcome {
    pub fn enrollment(&self) -> &Enrollment {
        match self {
            InsertOutcome::Created(e) | InsertOutcome::Existing(e) => e,
        }
    }

    pub fn into_enrollment(self) -> Enrollment {
        match self {
            InsertOutcome::Created(e) | InsertOutcome::Existing(e) => e,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, InsertOutcome::Created(_))
    }
}

/// Port for enrollment persistence.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Inserts `enrollment` unless the `(student, course)` pair already has a row.
    ///
    /// Must be a single atomic operation against the uniqueness constraint,
    /// never a read followed by a write.
    ///
    /// # Errors
    ///
    /// - `ErrorCode::PaymentReferenceInUse` (detail `payment_id`) when the
    ///   payment reference already belongs to a different pair
    /// - `ErrorCode::DatabaseError` on storage failure
    async fn insert_if_absent(&self, enrollment: &Enrollment) -> Result<InsertOutcome, DomainError>;

    /// Finds the enrollment for a pair.
    async fn find(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError>;

    /// Lists a student's enrollments, newest first.
    async fn list_for_student(&self, student_id: &StudentId) -> Result<Vec<Enrollment>, DomainError>;
}
