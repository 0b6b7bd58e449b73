//! In-memory ProfileDirectory.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::enrollment::StudentProfile;
use crate::domain::foundation::{DomainError, StudentId};
use crate::ports::ProfileDirectory;

#[derive(Default)]
pub struct InMemoryProfileDirectory {
    profiles: RwLock<HashMap<StudentId, StudentProfile>>,
}

impl InMemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, profile: StudentProfile) {
        self.profiles.write().await.insert(profile.id, profile);
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn find_profile(&self, id: &StudentId) -> Result<Option<StudentProfile>, DomainError> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn ensure_profile(&self, profile: StudentProfile) -> Result<StudentProfile, DomainError> {
        let mut profiles = self.profiles.write().await;
        Ok(profiles.entry(profile.id).or_insert(profile).clone())
    }
}
