//! In-memory EnrollmentStore.
//!
//! The check and the insert happen under one write lock, which gives the same
//! atomicity the database constraint gives in production. Both uniqueness
//! rules are enforced.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::enrollment::Enrollment;
use crate::domain::foundation::{CourseId, DomainError, ErrorCode, StudentId};
use crate::ports::{EnrollmentStore, InsertOutcome};

#[derive(Default)]
pub struct InMemoryEnrollmentStore {
    rows: RwLock<HashMap<(StudentId, CourseId), Enrollment>>,
    unavailable: AtomicBool,
}

impl InMemoryEnrollmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "enrollment store unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn insert_if_absent(&self, enrollment: &Enrollment) -> Result<InsertOutcome, DomainError> {
        self.check_available()?;
        let mut rows = self.rows.write().await;

        let key = (enrollment.student_id(), enrollment.course_id());
        if let Some(existing) = rows.get(&key) {
            return Ok(InsertOutcome::Existing(existing.clone()));
        }

        if !enrollment.has_free_reference()
            && rows.values().any(|e| e.payment_id() == enrollment.payment_id())
        {
            return Err(DomainError::new(
                ErrorCode::PaymentReferenceInUse,
                "Payment reference already bound to another enrollment",
            )
            .with_detail("payment_id", enrollment.payment_id()));
        }

        rows.insert(key, enrollment.clone());
        Ok(InsertOutcome::Created(enrollment.clone()))
    }

    async fn find(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        self.check_available()?;
        Ok(self.rows.read().await.get(&(*student_id, *course_id)).cloned())
    }

    async fn list_for_student(&self, student_id: &StudentId) -> Result<Vec<Enrollment>, DomainError> {
        self.check_available()?;
        let mut enrollments: Vec<Enrollment> = self
            .rows
            .read()
            .await
            .values()
            .filter(|e| e.student_id() == *student_id)
            .cloned()
            .collect();
        enrollments.sort_by(|a, b| b.enrolled_at().cmp(&a.enrolled_at()));
        Ok(enrollments)
    }
}
