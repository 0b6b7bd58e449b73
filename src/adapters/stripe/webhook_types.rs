//! Stripe-specific types for checkout sessions and webhook events.
//!
//! These types represent Stripe API objects as they arrive over the wire.
//! `parse_stripe_event` maps them onto the provider-neutral `PaymentEvent`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ports::{
    CheckoutSessionSummary, PaymentError, PaymentEvent, PaymentEventData, PaymentEventType,
    SessionPaymentStatus,
};

// ════════════════════════════════════════════════════════════════════════════════
// Events
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe event envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    pub id: String,

    /// Event type (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    pub created: i64,

    pub data: StripeEventData,

    /// False for test-mode events.
    #[serde(default)]
    pub livemode: bool,

    #[serde(default)]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEventData {
    /// The object the event is about; shape depends on the event type.
    pub object: serde_json::Value,
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout sessions
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe Checkout Session object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCheckoutSession {
    /// Session identifier (cs_...).
    pub id: String,

    /// Hosted checkout page. Only present while the session is open.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub customer_email: Option<String>,

    #[serde(default)]
    pub customer_details: Option<StripeCustomerDetails>,

    /// "paid", "unpaid" or "no_payment_required".
    #[serde(default)]
    pub payment_status: String,

    /// "open", "complete" or "expired".
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub mode: Option<String>,

    /// Total in minor units after discounts and taxes.
    #[serde(default)]
    pub amount_total: Option<i64>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,

    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeCustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl From<StripeCheckoutSession> for CheckoutSessionSummary {
    fn from(session: StripeCheckoutSession) -> Self {
        let customer_email = session
            .customer_email
            .or_else(|| session.customer_details.and_then(|d| d.email));

        CheckoutSessionSummary {
            id: session.id,
            payment_status: SessionPaymentStatus::from_provider(&session.payment_status),
            amount_total: session.amount_total,
            currency: session.currency,
            customer_email,
            metadata: session.metadata,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// API errors
// ════════════════════════════════════════════════════════════════════════════════

/// Error body returned by the Stripe REST API.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Parses a verified webhook body into a `PaymentEvent`.
///
/// Checkout session events carry a `CheckoutSessionSummary`; everything else
/// is `PaymentEventData::Other`.
pub fn parse_stripe_event(payload: &[u8]) -> Result<PaymentEvent, PaymentError> {
    let raw: serde_json::Value = serde_json::from_slice(payload)
        .map_err(|e| PaymentError::malformed_event(format!("Invalid JSON: {}", e)))?;
    let event: StripeWebhookEvent = serde_json::from_value(raw.clone())
        .map_err(|e| PaymentError::malformed_event(format!("Invalid event: {}", e)))?;

    let event_type = PaymentEventType::from_provider(&event.event_type);

    let data = if event.event_type.starts_with("checkout.session.") {
        let session: StripeCheckoutSession = serde_json::from_value(event.data.object)
            .map_err(|e| {
                PaymentError::malformed_event(format!("Invalid checkout session: {}", e))
            })?;
        PaymentEventData::CheckoutSession(session.into())
    } else {
        PaymentEventData::Other
    };

    Ok(PaymentEvent {
        id: event.id,
        event_type,
        created_at: event.created,
        livemode: event.livemode,
        data,
        payload: raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PaymentErrorCode;

    fn completed_event(payment_status: &str) -> String {
        serde_json::json!({
            "id": "evt_test123",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "livemode": false,
            "data": {
                "object": {
                    "id": "cs_test_abc",
                    "object": "checkout.session",
                    "payment_status": payment_status,
                    "status": "complete",
                    "mode": "payment",
                    "amount_total": 4999,
                    "currency": "usd",
                    "customer_details": { "email": "student@example.com" },
                    "metadata": { "student_id": "s", "course_id": "c" }
                }
            }
        })
        .to_string()
    }

    #[test]
    fn parses_completed_checkout_session() {
        let event = parse_stripe_event(completed_event("paid").as_bytes()).unwrap();

        assert_eq!(event.id, "evt_test123");
        assert_eq!(event.event_type, PaymentEventType::CheckoutSessionCompleted);
        let session = event.data.checkout_session().unwrap();
        assert_eq!(session.id, "cs_test_abc");
        assert_eq!(session.payment_status, SessionPaymentStatus::Paid);
        assert_eq!(session.amount_total, Some(4999));
        assert_eq!(session.customer_email.as_deref(), Some("student@example.com"));
        assert_eq!(session.metadata.get("course_id").map(String::as_str), Some("c"));
    }

    #[test]
    fn keeps_raw_payload() {
        let event = parse_stripe_event(completed_event("unpaid").as_bytes()).unwrap();
        assert_eq!(event.payload["data"]["object"]["id"], "cs_test_abc");
    }

    #[test]
    fn non_checkout_events_have_no_session() {
        let body = r#"{"id":"evt_1","type":"customer.created","created":1,"data":{"object":{"id":"cus_1"}}}"#;
        let event = parse_stripe_event(body.as_bytes()).unwrap();
        assert_eq!(event.data, PaymentEventData::Other);
        assert_eq!(event.event_type.as_str(), "customer.created");
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_stripe_event(b"not valid json").unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::MalformedEvent);
        assert!(err.message.contains("Invalid JSON"));
    }

    #[test]
    fn rejects_checkout_event_without_session_id() {
        let body = r#"{"id":"evt_1","type":"checkout.session.completed","created":1,"data":{"object":{}}}"#;
        let err = parse_stripe_event(body.as_bytes()).unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::MalformedEvent);
    }
}
