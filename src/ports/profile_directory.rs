//! ProfileDirectory port - student profile lookup and provisioning.

use async_trait::async_trait;

use crate::domain::enrollment::StudentProfile;
use crate::domain::foundation::{DomainError, StudentId};

/// Port for student profiles.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Finds a profile by student id.
    async fn find_profile(&self, id: &StudentId) -> Result<Option<StudentProfile>, DomainError>;

    /// Creates the profile if it does not exist and returns the stored record.
    ///
    /// Idempotent: an existing profile is returned unchanged.
    async fn ensure_profile(&self, profile: StudentProfile) -> Result<StudentProfile, DomainError>;
}
