//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API:
//! one-off `mode=payment` checkout sessions with inline price data, and
//! webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::domain::payment::WebhookSignatureVerifier;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode, PaymentEvent,
    PaymentProvider,
};

use super::webhook_types::{parse_stripe_event, StripeCheckoutSession, StripeErrorEnvelope};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Reject test-mode events.
    require_livemode: bool,

    /// Per-request HTTP timeout.
    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            require_livemode: false,
            timeout: Duration::from_secs(10),
        }
    }

    /// Builds the adapter configuration from the application's payment section.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            api_key: config.stripe_api_key.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
            api_base_url: config.api_base_url.clone(),
            require_livemode: config.require_livemode,
            timeout: config.provider_timeout(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    verifier: WebhookSignatureVerifier,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        let verifier = WebhookSignatureVerifier::new(config.webhook_secret.clone());

        Self {
            config,
            verifier,
            http_client,
        }
    }

    /// Form parameters for a one-off course purchase.
    fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(String, String)> {
        let item = &request.line_item;
        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("client_reference_id".into(), request.student_id.to_string()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("line_items[0][price_data][currency]".into(), item.currency.clone()),
            (
                "line_items[0][price_data][unit_amount]".into(),
                item.unit_amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".into(),
                item.name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".into(),
                item.description.clone(),
            ),
        ];

        if let Some(image) = &item.image_url {
            params.push((
                "line_items[0][price_data][product_data][images][0]".into(),
                image.clone(),
            ));
        }

        if let Some(email) = &request.customer_email {
            params.push(("customer_email".into(), email.clone()));
        }

        let mut metadata: Vec<_> = request.metadata.iter().collect();
        metadata.sort();
        for (key, value) in metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        params
    }

    fn transport_error(e: reqwest::Error) -> PaymentError {
        if e.is_timeout() {
            PaymentError::timeout(e.to_string())
        } else {
            PaymentError::network(e.to_string())
        }
    }

    /// Maps a non-success Stripe response onto a `PaymentError`.
    fn api_error(status: reqwest::StatusCode, body: &str) -> PaymentError {
        let parsed = serde_json::from_str::<StripeErrorEnvelope>(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|p| p.error.message.clone())
            .unwrap_or_else(|| format!("Stripe API error ({})", status));

        let mut err = match status.as_u16() {
            401 | 403 => PaymentError::authentication(message),
            429 => PaymentError::new(PaymentErrorCode::RateLimitExceeded, message),
            400..=499 => PaymentError::invalid_request(message),
            _ => {
                let mut e = PaymentError::provider(message);
                e.retryable = true;
                e
            }
        };

        if let Some(code) = parsed.and_then(|p| p.error.code.or(p.error.error_type)) {
            err = err.with_provider_code(code);
        }
        err
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = Self::checkout_params(&request);

        let mut builder = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params);
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        let response = builder.send().await.map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = Self::api_error(status, &body);
            tracing::error!(
                status = status.as_u16(),
                code = %err.code,
                course_id = %request.course_id,
                "Stripe create_checkout_session failed"
            );
            return Err(err);
        }

        let session: StripeCheckoutSession = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        let checkout_url = session.url.ok_or_else(|| {
            PaymentError::provider(format!("Checkout session {} has no URL", session.id))
        })?;

        tracing::info!(
            session_id = %session.id,
            course_id = %request.course_id,
            student_id = %request.student_id,
            "Stripe checkout session created"
        );

        Ok(CheckoutSession {
            id: session.id,
            url: checkout_url,
            expires_at: session.expires_at,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentEvent, PaymentError> {
        self.verifier.verify(payload, signature).map_err(|e| {
            tracing::warn!(error = %e, "Stripe webhook signature rejected");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        let event = parse_stripe_event(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            e
        })?;

        if self.config.require_livemode && !event.livemode {
            tracing::warn!(event_id = %event.id, "Rejected test mode event in production");
            return Err(PaymentError::invalid_webhook(
                "Test mode events not allowed in production",
            ));
        }

        tracing::info!(
            event_id = %event.id,
            event_type = event.event_type.as_str(),
            "Webhook signature verified"
        );

        Ok(event)
    }
}
