//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Real webhook signature checks against a test secret
//! - Error injection
//! - Call tracking
//! - Artificial latency for timeout tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::payment::WebhookSignatureVerifier;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentEvent, PaymentProvider,
};

use super::webhook_types::parse_stripe_event;

/// Secret used by `MockPaymentProvider::new()`.
pub const MOCK_WEBHOOK_SECRET: &str = "whsec_mock_secret";

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// let body = event_json.as_bytes();
/// let header = sign_payload(MOCK_WEBHOOK_SECRET, now, body);
///
/// let event = mock.verify_webhook(body, &header).await?;
/// ```
#[derive(Clone)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
    verifier: WebhookSignatureVerifier,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Base for generated checkout URLs.
    checkout_base_url: String,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Delay applied before `create_checkout_session` answers.
    checkout_delay: Option<Duration>,

    /// Requests received by `create_checkout_session`.
    checkout_requests: Vec<CreateCheckoutRequest>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    session_counter: u64,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl Default for MockPaymentProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPaymentProvider {
    /// Create a mock that verifies webhooks against `MOCK_WEBHOOK_SECRET`.
    pub fn new() -> Self {
        Self::with_webhook_secret(MOCK_WEBHOOK_SECRET)
    }

    pub fn with_webhook_secret(secret: &str) -> Self {
        let state = MockState {
            checkout_base_url: "https://checkout.stripe.test/c/pay".to_string(),
            ..Default::default()
        };
        Self {
            inner: Arc::new(Mutex::new(state)),
            verifier: WebhookSignatureVerifier::new(SecretString::new(secret.to_string())),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    /// Delay checkout creation by `delay`.
    pub fn set_checkout_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().checkout_delay = Some(delay);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.call_count(method) > 0
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Requests passed to `create_checkout_session`, oldest first.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.inner.lock().unwrap().checkout_requests.clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        let mut state = self.inner.lock().unwrap();
        state.call_log.clear();
        state.checkout_requests.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.inner.lock().unwrap();

        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Global error is consumed
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record_call(
            "create_checkout_session",
            vec![
                request.student_id.to_string(),
                request.course_id.to_string(),
                request.line_item.unit_amount.to_string(),
            ],
        );

        let delay = self.inner.lock().unwrap().checkout_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.check_error("create_checkout_session")?;

        let mut state = self.inner.lock().unwrap();
        state.session_counter += 1;
        let id = format!("cs_mock_{}", state.session_counter);
        let url = format!("{}/{}", state.checkout_base_url, id);
        state.checkout_requests.push(request);

        Ok(CheckoutSession {
            id,
            url,
            expires_at: Some(chrono::Utc::now().timestamp() + 24 * 60 * 60),
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentEvent, PaymentError> {
        self.record_call("verify_webhook", vec![signature.to_string()]);
        self.check_error("verify_webhook")?;

        self.verifier
            .verify(payload, signature)
            .map_err(|e| PaymentError::invalid_webhook(e.to_string()))?;

        parse_stripe_event(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CourseId, StudentId};
    use crate::domain::payment::sign_payload;
    use crate::ports::{CheckoutLineItem, PaymentErrorCode};

    fn request() -> CreateCheckoutRequest {
        CreateCheckoutRequest {
            student_id: StudentId::new(),
            course_id: CourseId::new(),
            customer_email: None,
            line_item: CheckoutLineItem {
                name: "Course".to_string(),
                description: "About".to_string(),
                image_url: None,
                unit_amount: 1000,
                currency: "usd".to_string(),
            },
            success_url: "https://app.test/courses/c".to_string(),
            cancel_url: "https://app.test/courses/c?canceled=true".to_string(),
            metadata: HashMap::new(),
            idempotency_key: None,
        }
    }

    #[tokio::test]
    async fn creates_distinct_sessions_and_tracks_calls() {
        let mock = MockPaymentProvider::new();

        let first = mock.create_checkout_session(request()).await.unwrap();
        let second = mock.create_checkout_session(request()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(first.url.ends_with(&first.id));
        assert_eq!(mock.call_count("create_checkout_session"), 2);
        assert_eq!(mock.checkout_requests().len(), 2);
    }

    #[tokio::test]
    async fn global_error_is_consumed_once() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::network("down"));

        assert!(mock.create_checkout_session(request()).await.is_err());
        assert!(mock.create_checkout_session(request()).await.is_ok());
    }

    #[tokio::test]
    async fn method_error_persists_until_cleared() {
        let mock = MockPaymentProvider::new();
        mock.set_method_error("create_checkout_session", PaymentError::authentication("bad key"));

        assert!(mock.create_checkout_session(request()).await.is_err());
        assert!(mock.create_checkout_session(request()).await.is_err());

        mock.clear_errors();
        assert!(mock.create_checkout_session(request()).await.is_ok());
    }

    #[tokio::test]
    async fn verifies_real_signatures() {
        let mock = MockPaymentProvider::new();
        let body = br#"{"id":"evt_1","type":"customer.created","created":1,"data":{"object":{}}}"#;
        let header = sign_payload(MOCK_WEBHOOK_SECRET, chrono::Utc::now().timestamp(), body);

        let event = mock.verify_webhook(body, &header).await.unwrap();
        assert_eq!(event.id, "evt_1");

        let forged = sign_payload("whsec_other", chrono::Utc::now().timestamp(), body);
        let err = mock.verify_webhook(body, &forged).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
    }
}
