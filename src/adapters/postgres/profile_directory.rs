//! PostgreSQL implementation of ProfileDirectory.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::enrollment::StudentProfile;
use crate::domain::foundation::{DomainError, StudentId};
use crate::ports::ProfileDirectory;

pub struct PostgresProfileDirectory {
    pool: PgPool,
}

impl PostgresProfileDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    avatar_url: Option<String>,
}

impl From<ProfileRow> for StudentProfile {
    fn from(row: ProfileRow) -> Self {
        StudentProfile {
            id: StudentId::from_uuid(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            avatar_url: row.avatar_url,
        }
    }
}

#[async_trait]
impl ProfileDirectory for PostgresProfileDirectory {
    async fn find_profile(&self, id: &StudentId) -> Result<Option<StudentProfile>, DomainError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT id, email, first_name, last_name, avatar_url FROM profiles WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load profile", e))?;

        Ok(row.map(StudentProfile::from))
    }

    async fn ensure_profile(&self, profile: StudentProfile) -> Result<StudentProfile, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, email, first_name, last_name, avatar_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(profile.id.as_uuid())
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.avatar_url)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to provision profile", e))?;

        let id = profile.id;
        Ok(self.find_profile(&id).await?.unwrap_or(profile))
    }
}
