//! Payment provider port for hosted checkout and signed webhooks.
//!
//! Defines the contract for payment gateway integrations (e.g., Stripe).
//!
//! # Design
//!
//! - **Gateway agnostic**: handlers never see provider wire types
//! - **One-off payments**: a checkout session buys one course
//! - **Verified events only**: `verify_webhook` is the sole trust boundary

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, StudentId};

/// Port for payment provider integrations.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a hosted checkout session.
    ///
    /// Returns a URL for the customer to complete payment.
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError>;

    /// Verify a webhook signature and parse the event.
    ///
    /// Returns the parsed event if valid, error if signature invalid.
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> Result<PaymentEvent, PaymentError>;
}

/// A single course line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    /// Unit price in minor units.
    pub unit_amount: i64,
    /// ISO currency code, lowercase.
    pub currency: String,
}

/// Request to create a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCheckoutRequest {
    pub student_id: StudentId,
    pub course_id: CourseId,

    /// Customer email for pre-fill.
    pub customer_email: Option<String>,

    pub line_item: CheckoutLineItem,

    /// URL to redirect after successful checkout.
    pub success_url: String,

    /// URL to redirect after canceled checkout.
    pub cancel_url: String,

    /// Opaque metadata echoed back on the session's webhook events.
    pub metadata: HashMap<String, String>,

    /// Idempotency key for safe retries.
    pub idempotency_key: Option<String>,
}

impl CreateCheckoutRequest {
    /// Sets the idempotency key to a digest of every parameter sent upstream.
    ///
    /// Identical requests share a key, so a repeated click reuses the open
    /// session. Any changed parameter (price, email, URLs) yields a new key.
    pub fn with_derived_idempotency_key(mut self) -> Self {
        let mut hasher = Sha256::new();
        let mut field = |value: &str| {
            hasher.update((value.len() as u64).to_be_bytes());
            hasher.update(value.as_bytes());
        };

        field(&self.student_id.to_string());
        field(&self.course_id.to_string());
        field(self.customer_email.as_deref().unwrap_or(""));
        field(&self.line_item.name);
        field(&self.line_item.description);
        field(self.line_item.image_url.as_deref().unwrap_or(""));
        field(&self.line_item.unit_amount.to_string());
        field(&self.line_item.currency);
        field(&self.success_url);
        field(&self.cancel_url);

        let mut metadata: Vec<_> = self.metadata.iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            field(key);
            field(value);
        }

        self.idempotency_key = Some(format!("checkout-{}", hex::encode(hasher.finalize())));
        self
    }
}

/// Checkout session for payment completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID.
    pub id: String,

    /// Hosted checkout URL.
    pub url: String,

    /// When the session expires (Unix timestamp).
    pub expires_at: Option<i64>,
}

/// Verified event from the payment provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    pub event_type: PaymentEventType,
    /// When the event occurred (Unix timestamp).
    pub created_at: i64,
    pub livemode: bool,
    pub data: PaymentEventData,
    /// Raw event body, kept for the audit log.
    pub payload: serde_json::Value,
}

/// Event types this system distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEventType {
    CheckoutSessionCompleted,
    CheckoutSessionAsyncPaymentSucceeded,
    CheckoutSessionAsyncPaymentFailed,
    CheckoutSessionExpired,
    Unknown(String),
}

impl PaymentEventType {
    pub fn from_provider(s: &str) -> Self {
        match s {
            "checkout.session.completed" => PaymentEventType::CheckoutSessionCompleted,
            "checkout.session.async_payment_succeeded" => {
                PaymentEventType::CheckoutSessionAsyncPaymentSucceeded
            }
            "checkout.session.async_payment_failed" => {
                PaymentEventType::CheckoutSessionAsyncPaymentFailed
            }
            "checkout.session.expired" => PaymentEventType::CheckoutSessionExpired,
            other => PaymentEventType::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaymentEventType::CheckoutSessionCompleted => "checkout.session.completed",
            PaymentEventType::CheckoutSessionAsyncPaymentSucceeded => {
                "checkout.session.async_payment_succeeded"
            }
            PaymentEventType::CheckoutSessionAsyncPaymentFailed => {
                "checkout.session.async_payment_failed"
            }
            PaymentEventType::CheckoutSessionExpired => "checkout.session.expired",
            PaymentEventType::Unknown(s) => s,
        }
    }
}

/// Payment state of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    Unknown,
}

impl SessionPaymentStatus {
    pub fn from_provider(s: &str) -> Self {
        match s {
            "paid" => SessionPaymentStatus::Paid,
            "unpaid" => SessionPaymentStatus::Unpaid,
            "no_payment_required" => SessionPaymentStatus::NoPaymentRequired,
            _ => SessionPaymentStatus::Unknown,
        }
    }

    /// True once funds are settled or none were due.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SessionPaymentStatus::Paid | SessionPaymentStatus::NoPaymentRequired
        )
    }
}

/// Checkout session fields carried by checkout events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSessionSummary {
    pub id: String,
    pub payment_status: SessionPaymentStatus,
    /// Settled total in minor units.
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentEventData {
    CheckoutSession(CheckoutSessionSummary),
    /// Event objects this system does not interpret.
    Other,
}

impl PaymentEventData {
    pub fn checkout_session(&self) -> Option<&CheckoutSessionSummary> {
        match self {
            PaymentEventData::CheckoutSession(s) => Some(s),
            PaymentEventData::Other => None,
        }
    }
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::Timeout, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::AuthenticationError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    pub fn malformed_event(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::MalformedEvent, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = if err.retryable {
            ErrorCode::PaymentProviderUnavailable
        } else {
            match err.code {
                PaymentErrorCode::InvalidWebhook | PaymentErrorCode::MalformedEvent => {
                    ErrorCode::ValidationFailed
                }
                _ => ErrorCode::PaymentProviderError,
            }
        };

        DomainError::new(code, err.message)
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// Request exceeded the client timeout.
    Timeout,

    /// API authentication failed.
    AuthenticationError,

    /// Provider rejected the request parameters.
    InvalidRequest,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Signature missing, stale or not matching.
    InvalidWebhook,

    /// Signed body is not a well-formed event.
    MalformedEvent,

    /// Provider API error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError
                | PaymentErrorCode::Timeout
                | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::Timeout => "timeout",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::MalformedEvent => "malformed_event",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
