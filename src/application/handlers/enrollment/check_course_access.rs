//! CheckCourseAccessHandler - Query handler guarding protected course content.
//!
//! Runs on every protected request. Read-only: an existing enrollment row is
//! the only thing that authorizes, and denial is a normal result.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::enrollment::{
    course_path, AccessDecision, DenialReason, EnrollmentError, SITE_ROOT,
};
use crate::domain::foundation::{CourseId, StudentId};
use crate::ports::{CourseCatalog, EnrollmentStore, ProfileDirectory};

use super::store_call::{with_store_timeout, DEFAULT_STORE_TIMEOUT};

/// Query to check whether a viewer may load a course's content.
#[derive(Debug, Clone)]
pub struct CheckCourseAccessQuery {
    /// `None` for anonymous requests.
    pub viewer: Option<StudentId>,
    pub course_id: CourseId,
}

/// Handler for course access checks.
pub struct CheckCourseAccessHandler {
    store: Arc<dyn EnrollmentStore>,
    profiles: Arc<dyn ProfileDirectory>,
    catalog: Arc<dyn CourseCatalog>,
    store_timeout: Duration,
}

impl CheckCourseAccessHandler {
    pub fn new(
        store: Arc<dyn EnrollmentStore>,
        profiles: Arc<dyn ProfileDirectory>,
        catalog: Arc<dyn CourseCatalog>,
    ) -> Self {
        Self {
            store,
            profiles,
            catalog,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub async fn handle(
        &self,
        query: CheckCourseAccessQuery,
    ) -> Result<AccessDecision, EnrollmentError> {
        let Some(viewer) = query.viewer else {
            return Ok(AccessDecision::denied(DenialReason::Unauthenticated, SITE_ROOT));
        };

        let profile = with_store_timeout(
            self.store_timeout,
            "find_profile",
            self.profiles.find_profile(&viewer),
        )
        .await?;
        if profile.is_none() {
            return Ok(AccessDecision::denied(DenialReason::NoProfile, SITE_ROOT));
        }

        let enrollment = with_store_timeout(
            self.store_timeout,
            "find_enrollment",
            self.store.find(&viewer, &query.course_id),
        )
        .await?;

        match enrollment {
            Some(enrollment) => Ok(AccessDecision::Authorized { enrollment }),
            None => {
                let redirect = self.purchase_page(query.course_id).await;
                Ok(AccessDecision::denied(DenialReason::NotEnrolled, redirect))
            }
        }
    }

    /// The course's public page. Catalog failures fall back to the id path.
    async fn purchase_page(&self, course_id: CourseId) -> String {
        match with_store_timeout(
            self.store_timeout,
            "get_course_by_id",
            self.catalog.get_course_by_id(&course_id),
        )
        .await
        {
            Ok(Some(course)) => course.public_path(),
            Ok(None) => course_path(None, course_id),
            Err(e) => {
                tracing::warn!(course_id = %course_id, error = %e, "Course lookup failed for denial redirect");
                course_path(None, course_id)
            }
        }
    }
}
