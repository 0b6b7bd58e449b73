//! HandlePaymentWebhookHandler - Command handler for processing payment provider webhooks.
//!
//! A verified payment-succeeded event is the only thing that enrolls a
//! student in a paid course. Deliveries are at-least-once and unordered, so
//! every step is safe to repeat.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::enrollment::money::from_minor_units;
use crate::domain::enrollment::{AnomalyKind, CheckoutIntent, Enrollment, EnrollmentError};
use crate::domain::payment::WebhookError;
use crate::ports::{
    CheckoutSessionSummary, PaymentErrorCode, PaymentEvent, PaymentEventType, PaymentProvider,
    WebhookEventRecord, WebhookEventRepository,
};

use super::fulfill_enrollment::{FulfillEnrollmentCommand, FulfillEnrollmentHandler};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header, if present.
    pub signature: Option<String>,
}

/// Result of webhook processing. Every variant is acknowledged to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlePaymentWebhookResult {
    /// Payment confirmed and the student is enrolled.
    EnrollmentFulfilled {
        event_id: String,
        enrollment: Enrollment,
        created: bool,
        anomaly: Option<AnomalyKind>,
    },
    /// Event id already recorded with a final outcome.
    AlreadyProcessed { event_id: String },
    /// Event acknowledged but no action taken.
    Ignored { event_id: String, reason: String },
    /// Authentic event that can never be applied. Logged and recorded as failed.
    Unprocessable { event_id: String, reason: String },
}

/// Handler for processing payment provider webhooks.
pub struct HandlePaymentWebhookHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    fulfill: Arc<FulfillEnrollmentHandler>,
    event_log: Arc<dyn WebhookEventRepository>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        fulfill: Arc<FulfillEnrollmentHandler>,
        event_log: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self {
            payment_provider,
            fulfill,
            event_log,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Verify signature and parse event
        let signature = cmd
            .signature
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                tracing::warn!(security_event = true, "Webhook rejected: missing signature header");
                WebhookError::SignatureVerificationFailed("missing signature header".to_string())
            })?;

        let event = self
            .payment_provider
            .verify_webhook(&cmd.payload, signature)
            .await
            .map_err(|e| match e.code {
                PaymentErrorCode::MalformedEvent => {
                    tracing::warn!(error = %e, "Webhook rejected: malformed event");
                    WebhookError::ParseError(e.message)
                }
                _ => {
                    tracing::warn!(security_event = true, error = %e, "Webhook rejected: signature verification failed");
                    WebhookError::SignatureVerificationFailed(e.message)
                }
            })?;

        // 2. Short-circuit events we already finished
        if self.already_processed(&event.id).await {
            tracing::debug!(event_id = %event.id, "Duplicate webhook delivery");
            return Ok(HandlePaymentWebhookResult::AlreadyProcessed { event_id: event.id });
        }

        // 3. Dispatch on event type
        match &event.event_type {
            PaymentEventType::CheckoutSessionCompleted => {
                let session = checkout_session(&event)?;
                if !session.payment_status.is_settled() {
                    return Ok(self
                        .ignore(&event, "payment not settled; awaiting async confirmation")
                        .await);
                }
                self.fulfill_session(&event, session).await
            }
            PaymentEventType::CheckoutSessionAsyncPaymentSucceeded => {
                let session = checkout_session(&event)?;
                self.fulfill_session(&event, session).await
            }
            PaymentEventType::CheckoutSessionAsyncPaymentFailed
            | PaymentEventType::CheckoutSessionExpired => {
                Ok(self.ignore(&event, "checkout did not complete").await)
            }
            PaymentEventType::Unknown(_) => Ok(self.ignore(&event, "unhandled event type").await),
        }
    }

    async fn fulfill_session(
        &self,
        event: &PaymentEvent,
        session: &CheckoutSessionSummary,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // Intent written at checkout initiation
        let intent = CheckoutIntent::from_metadata(&session.metadata).map_err(|e| {
            tracing::warn!(
                event_id = %event.id,
                session_id = %session.id,
                error = %e,
                "Checkout session has no usable enrollment metadata"
            );
            WebhookError::MissingMetadata(e.to_string())
        })?;

        let amount = settled_amount(event, session, &intent)?;

        let result = self
            .fulfill
            .handle(FulfillEnrollmentCommand {
                student_id: intent.student_id,
                course_id: intent.course_id,
                payment_id: session.id.clone(),
                amount,
            })
            .await;

        match result {
            Ok(outcome) => {
                let record = match &outcome.anomaly {
                    Some(anomaly) => WebhookEventRecord::anomaly(
                        &event.id,
                        event.event_type.as_str(),
                        anomaly.kind.as_str(),
                        event.payload.clone(),
                    ),
                    None => WebhookEventRecord::success(
                        &event.id,
                        event.event_type.as_str(),
                        event.payload.clone(),
                    ),
                };
                self.record(record).await;

                tracing::info!(
                    event_id = %event.id,
                    session_id = %session.id,
                    enrollment_id = %outcome.enrollment.id(),
                    created = outcome.created,
                    "Webhook fulfilled enrollment"
                );

                Ok(HandlePaymentWebhookResult::EnrollmentFulfilled {
                    event_id: event.id.clone(),
                    created: outcome.created,
                    anomaly: outcome.anomaly.map(|a| a.kind),
                    enrollment: outcome.enrollment,
                })
            }
            Err(e) if e.is_retryable() => {
                tracing::warn!(event_id = %event.id, error = %e, "Webhook fulfillment deferred to provider retry");
                Err(WebhookError::StoreUnavailable(e.to_string()))
            }
            Err(e) => Ok(self.unprocessable(event, e).await),
        }
    }

    /// Acknowledges an authentic event that will never succeed.
    async fn unprocessable(
        &self,
        event: &PaymentEvent,
        err: EnrollmentError,
    ) -> HandlePaymentWebhookResult {
        tracing::error!(
            event_id = %event.id,
            event_type = event.event_type.as_str(),
            code = %err.code(),
            error = %err,
            "Webhook event cannot be applied; acknowledging without enrollment"
        );
        self.record(WebhookEventRecord::failed(
            &event.id,
            event.event_type.as_str(),
            err.to_string(),
            event.payload.clone(),
        ))
        .await;

        HandlePaymentWebhookResult::Unprocessable {
            event_id: event.id.clone(),
            reason: err.to_string(),
        }
    }

    async fn ignore(&self, event: &PaymentEvent, reason: &str) -> HandlePaymentWebhookResult {
        tracing::debug!(event_id = %event.id, event_type = event.event_type.as_str(), reason, "Webhook ignored");
        self.record(WebhookEventRecord::ignored(
            &event.id,
            event.event_type.as_str(),
            reason,
            event.payload.clone(),
        ))
        .await;

        HandlePaymentWebhookResult::Ignored {
            event_id: event.id.clone(),
            reason: reason.to_string(),
        }
    }

    async fn already_processed(&self, event_id: &str) -> bool {
        match self.event_log.find_by_event_id(event_id).await {
            Ok(Some(record)) => record.outcome.is_final(),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(event_id, error = %e, "Webhook event log lookup failed");
                false
            }
        }
    }

    /// Event log writes never fail the delivery.
    async fn record(&self, record: WebhookEventRecord) {
        let event_id = record.event_id.clone();
        if let Err(e) = self.event_log.save(record).await {
            tracing::warn!(event_id = %event_id, error = %e, "Failed to record webhook event");
        }
    }
}

fn checkout_session(event: &PaymentEvent) -> Result<&CheckoutSessionSummary, WebhookError> {
    event.data.checkout_session().ok_or_else(|| {
        WebhookError::ParseError(format!(
            "{} event carries no checkout session",
            event.event_type.as_str()
        ))
    })
}

/// Settled total, falling back to the price snapshot from initiation.
fn settled_amount(
    event: &PaymentEvent,
    session: &CheckoutSessionSummary,
    intent: &CheckoutIntent,
) -> Result<Decimal, WebhookError> {
    match (session.amount_total, intent.price_at_time) {
        (Some(total), snapshot) => {
            if let Some(snapshot) = snapshot.filter(|s| *s != total) {
                tracing::warn!(
                    target: "reconciliation",
                    event_id = %event.id,
                    session_id = %session.id,
                    amount_total = total,
                    price_at_time = snapshot,
                    "Settled amount differs from price at checkout"
                );
            }
            Ok(from_minor_units(total))
        }
        (None, Some(snapshot)) => Ok(from_minor_units(snapshot)),
        (None, None) => Err(WebhookError::MissingField("amount_total")),
    }
}
