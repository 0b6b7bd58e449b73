//! Webhook error types.
//!
//! Status codes drive the provider's retry behaviour:
//! - 2xx: acknowledged, no retry
//! - 4xx: rejected, no retry
//! - 5xx: transient, the provider redelivers

use axum::http::StatusCode;
use thiserror::Error;

use super::SignatureError;

/// Errors that reject a webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header missing or not matching the payload.
    #[error("Signature verification failed: {0}")]
    SignatureVerificationFailed(String),

    /// Body is not a well-formed event.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Checkout session lacks the intent metadata written at initiation.
    #[error("Missing metadata: {0}")]
    MissingMetadata(String),

    /// Required field missing from the event payload.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Enrollment store failed or timed out.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl WebhookError {
    /// Returns true if the provider should redeliver this event.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::StoreUnavailable(_))
    }

    /// Maps the error to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::SignatureVerificationFailed(_)
            | WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_)
            | WebhookError::MissingField(_) => StatusCode::BAD_REQUEST,
            WebhookError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a security-relevant rejection.
    pub fn is_security_event(&self) -> bool {
        matches!(self, WebhookError::SignatureVerificationFailed(_))
    }
}

impl From<SignatureError> for WebhookError {
    fn from(err: SignatureError) -> Self {
        WebhookError::SignatureVerificationFailed(err.to_string())
    }
}
