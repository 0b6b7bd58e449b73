//! Bounded store calls.

use std::future::Future;
use std::time::Duration;

use crate::domain::enrollment::EnrollmentError;
use crate::domain::foundation::DomainError;

/// Store timeout used when a handler is not configured with one.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Awaits a port call, failing with `StoreUnavailable` once `limit` elapses.
pub(super) async fn with_store_timeout<T, F>(
    limit: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, EnrollmentError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(EnrollmentError::from),
        Err(_) => {
            tracing::warn!(operation, timeout_ms = limit.as_millis() as u64, "Store call timed out");
            Err(EnrollmentError::store_unavailable(format!(
                "{} timed out after {}ms",
                operation,
                limit.as_millis()
            )))
        }
    }
}
