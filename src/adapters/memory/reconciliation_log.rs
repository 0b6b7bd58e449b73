//! In-memory ReconciliationLog.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::enrollment::ReconciliationAnomaly;
use crate::domain::foundation::DomainError;
use crate::ports::ReconciliationLog;

#[derive(Default)]
pub struct InMemoryReconciliationLog {
    anomalies: RwLock<Vec<ReconciliationAnomaly>>,
}

impl InMemoryReconciliationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub async fn anomalies(&self) -> Vec<ReconciliationAnomaly> {
        self.anomalies.read().await.clone()
    }
}

#[async_trait]
impl ReconciliationLog for InMemoryReconciliationLog {
    async fn record(&self, anomaly: &ReconciliationAnomaly) -> Result<(), DomainError> {
        self.anomalies.write().await.push(anomaly.clone());
        Ok(())
    }
}
