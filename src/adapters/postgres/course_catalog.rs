//! PostgreSQL implementation of CourseCatalog.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::enrollment::CourseReference;
use crate::domain::foundation::{CourseId, DomainError};
use crate::ports::CourseCatalog;

pub struct PostgresCourseCatalog {
    pool: PgPool,
}

impl PostgresCourseCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    price: Option<Decimal>,
    title: Option<String>,
    description: Option<String>,
    slug: Option<String>,
    image_url: Option<String>,
}

impl From<CourseRow> for CourseReference {
    fn from(row: CourseRow) -> Self {
        CourseReference {
            id: CourseId::from_uuid(row.id),
            price: row.price,
            title: row.title,
            description: row.description,
            slug: row.slug,
            image_url: row.image_url,
        }
    }
}

#[async_trait]
impl CourseCatalog for PostgresCourseCatalog {
    async fn get_course_by_id(&self, id: &CourseId) -> Result<Option<CourseReference>, DomainError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT id, price, title, description, slug, image_url
            FROM courses
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load course", e))?;

        Ok(row.map(CourseReference::from))
    }
}
