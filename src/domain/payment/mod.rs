//! Payment-side domain rules: webhook signatures and webhook rejection errors.

mod signature;
mod webhook_errors;

pub use signature::{
    sign_payload, SignatureError, SignatureHeader, WebhookSignatureVerifier, MAX_CLOCK_SKEW_SECS,
    MAX_EVENT_AGE_SECS,
};
pub use webhook_errors::WebhookError;
