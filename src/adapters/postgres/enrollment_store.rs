//! PostgreSQL implementation of EnrollmentStore.
//!
//! Creation is a single `INSERT ... ON CONFLICT DO NOTHING RETURNING`. When
//! nothing comes back, a conflict happened and the follow-up select tells the
//! two constraints apart: the `(student_id, course_id)` key yields the stored
//! row, the partial `payment_id` index yields `PaymentReferenceInUse`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::enrollment::{Enrollment, FREE_PAYMENT_ID};
use crate::domain::foundation::{
    CourseId, DomainError, EnrollmentId, ErrorCode, StudentId, Timestamp,
};
use crate::ports::{EnrollmentStore, InsertOutcome};

/// PostgreSQL implementation of the EnrollmentStore port.
pub struct PostgresEnrollmentStore {
    pool: PgPool,
}

impl PostgresEnrollmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an enrollment.
#[derive(Debug, sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    payment_id: String,
    amount: Decimal,
    enrolled_at: DateTime<Utc>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment::reconstitute(
            EnrollmentId::from_uuid(row.id),
            StudentId::from_uuid(row.student_id),
            CourseId::from_uuid(row.course_id),
            row.payment_id,
            row.amount,
            Timestamp::from_datetime(row.enrolled_at),
        )
    }
}

const SELECT_COLUMNS: &str = "id, student_id, course_id, payment_id, amount, enrolled_at";

fn map_insert_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return DomainError::validation("course_id", "Unknown course");
        }
        if db_err.is_check_violation() {
            return DomainError::validation(
                "amount",
                format!("Enrollment violates {}", db_err.constraint().unwrap_or("a check")),
            );
        }
    }
    DomainError::database("Failed to insert enrollment", e)
}

impl PostgresEnrollmentStore {
    async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Enrollment>, DomainError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM enrollments WHERE payment_id = $1 AND payment_id <> $2",
            SELECT_COLUMNS
        ))
        .bind(payment_id)
        .bind(FREE_PAYMENT_ID)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to look up payment reference", e))?;

        Ok(row.map(Enrollment::from))
    }
}

#[async_trait]
impl EnrollmentStore for PostgresEnrollmentStore {
    async fn insert_if_absent(&self, enrollment: &Enrollment) -> Result<InsertOutcome, DomainError> {
        let inserted: Option<EnrollmentRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO enrollments (id, student_id, course_id, payment_id, amount, is_free, enrolled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT DO NOTHING
            RETURNING {}
            "#,
            SELECT_COLUMNS
        ))
        .bind(enrollment.id().as_uuid())
        .bind(enrollment.student_id().as_uuid())
        .bind(enrollment.course_id().as_uuid())
        .bind(enrollment.payment_id())
        .bind(enrollment.amount())
        .bind(enrollment.is_free())
        .bind(enrollment.enrolled_at().as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_insert_error)?;

        if let Some(row) = inserted {
            return Ok(InsertOutcome::Created(row.into()));
        }

        if let Some(existing) = self
            .find(&enrollment.student_id(), &enrollment.course_id())
            .await?
        {
            return Ok(InsertOutcome::Existing(existing));
        }

        if let Some(holder) = self.find_by_payment_id(enrollment.payment_id()).await? {
            return Err(DomainError::new(
                ErrorCode::PaymentReferenceInUse,
                format!(
                    "Payment reference already bound to student {} course {}",
                    holder.student_id(),
                    holder.course_id()
                ),
            )
            .with_detail("payment_id", enrollment.payment_id()));
        }

        Err(DomainError::new(
            ErrorCode::DatabaseError,
            "Enrollment insert skipped but no conflicting row was found",
        ))
    }

    async fn find(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<Option<Enrollment>, DomainError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM enrollments WHERE student_id = $1 AND course_id = $2",
            SELECT_COLUMNS
        ))
        .bind(student_id.as_uuid())
        .bind(course_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to find enrollment", e))?;

        Ok(row.map(Enrollment::from))
    }

    async fn list_for_student(&self, student_id: &StudentId) -> Result<Vec<Enrollment>, DomainError> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM enrollments WHERE student_id = $1 ORDER BY enrolled_at DESC",
            SELECT_COLUMNS
        ))
        .bind(student_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list enrollments", e))?;

        Ok(rows.into_iter().map(Enrollment::from).collect())
    }
}
