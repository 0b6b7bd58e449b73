//! CourseCatalog port - read access to course data owned elsewhere.

use async_trait::async_trait;

use crate::domain::enrollment::CourseReference;
use crate::domain::foundation::{CourseId, DomainError};

/// Port for course lookups.
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    /// Returns the course, or `None` if no such course exists.
    async fn get_course_by_id(&self, id: &CourseId) -> Result<Option<CourseReference>, DomainError>;
}
