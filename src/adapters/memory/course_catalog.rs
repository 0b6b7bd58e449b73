//! In-memory CourseCatalog.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::enrollment::CourseReference;
use crate::domain::foundation::{CourseId, DomainError};
use crate::ports::CourseCatalog;

#[derive(Default)]
pub struct InMemoryCourseCatalog {
    courses: RwLock<HashMap<CourseId, CourseReference>>,
}

impl InMemoryCourseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a course.
    pub async fn upsert(&self, course: CourseReference) {
        self.courses.write().await.insert(course.id, course);
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourseCatalog {
    async fn get_course_by_id(&self, id: &CourseId) -> Result<Option<CourseReference>, DomainError> {
        Ok(self.courses.read().await.get(id).cloned())
    }
}
