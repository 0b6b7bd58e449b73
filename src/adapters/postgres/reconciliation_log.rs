//! PostgreSQL implementation of ReconciliationLog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::enrollment::ReconciliationAnomaly;
use crate::domain::foundation::DomainError;
use crate::ports::ReconciliationLog;

pub struct PostgresReconciliationLog {
    pool: PgPool,
}

impl PostgresReconciliationLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReconciliationLog for PostgresReconciliationLog {
    async fn record(&self, anomaly: &ReconciliationAnomaly) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO reconciliation_anomalies (
                kind, student_id, course_id,
                existing_payment_id, existing_amount,
                claimed_payment_id, claimed_amount,
                detected_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(anomaly.kind.as_str())
        .bind(anomaly.student_id.as_uuid())
        .bind(anomaly.course_id.as_uuid())
        .bind(&anomaly.existing_payment_id)
        .bind(anomaly.existing_amount)
        .bind(&anomaly.claimed_payment_id)
        .bind(anomaly.claimed_amount)
        .bind(anomaly.detected_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to record reconciliation anomaly", e))?;

        Ok(())
    }
}
