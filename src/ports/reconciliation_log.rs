//! ReconciliationLog port - out-of-band queue for billing discrepancies.
//!
//! Anomalies never block a fulfillment response. Recording one is best
//! effort; callers log and continue if the log is unavailable.

use async_trait::async_trait;

use crate::domain::enrollment::ReconciliationAnomaly;
use crate::domain::foundation::DomainError;

#[async_trait]
pub trait ReconciliationLog: Send + Sync {
    /// Appends an anomaly for manual review.
    async fn record(&self, anomaly: &ReconciliationAnomaly) -> Result<(), DomainError>;
}
