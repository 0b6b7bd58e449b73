//! ListStudentEnrollmentsHandler - Query handler for a student's enrollments.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::enrollment::{Enrollment, EnrollmentError};
use crate::domain::foundation::StudentId;
use crate::ports::EnrollmentStore;

use super::store_call::{with_store_timeout, DEFAULT_STORE_TIMEOUT};

/// Query for a student's enrollments.
#[derive(Debug, Clone)]
pub struct ListStudentEnrollmentsQuery {
    pub student_id: StudentId,
}

/// Handler returning enrollments newest first.
pub struct ListStudentEnrollmentsHandler {
    store: Arc<dyn EnrollmentStore>,
    store_timeout: Duration,
}

impl ListStudentEnrollmentsHandler {
    pub fn new(store: Arc<dyn EnrollmentStore>) -> Self {
        Self {
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn handle(
        &self,
        query: ListStudentEnrollmentsQuery,
    ) -> Result<Vec<Enrollment>, EnrollmentError> {
        with_store_timeout(
            self.store_timeout,
            "list_for_student",
            self.store.list_for_student(&query.student_id),
        )
        .await
    }
}
