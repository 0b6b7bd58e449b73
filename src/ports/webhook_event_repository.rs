//! WebhookEventRepository port - log of processed provider events.
//!
//! The provider delivers at least once. Recording each handled event id lets
//! redeliveries short-circuit before touching the enrollment store, and keeps
//! the payload for auditing. Fulfillment stays idempotent without it; the log
//! is an optimisation and an audit trail, never a correctness dependency.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// How an event was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookOutcome {
    /// Enrollment created or already present.
    Success,
    /// Event type or payment state not acted on.
    Ignored,
    /// Enrollment already present with conflicting payment data.
    Anomaly,
    /// Authentic but permanently unprocessable.
    Failed,
}

impl WebhookOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookOutcome::Success => "success",
            WebhookOutcome::Ignored => "ignored",
            WebhookOutcome::Anomaly => "anomaly",
            WebhookOutcome::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(WebhookOutcome::Success),
            "ignored" => Some(WebhookOutcome::Ignored),
            "anomaly" => Some(WebhookOutcome::Anomaly),
            "failed" => Some(WebhookOutcome::Failed),
            _ => None,
        }
    }

    /// True if a redelivery of this event needs no further work.
    pub fn is_final(&self) -> bool {
        !matches!(self, WebhookOutcome::Failed)
    }
}

/// Record of a processed webhook event.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Provider event ID (evt_xxx format).
    pub event_id: String,

    /// Provider event type (e.g., "checkout.session.completed").
    pub event_type: String,

    pub processed_at: DateTime<Utc>,

    pub outcome: WebhookOutcome,

    /// Reason for ignored, anomaly and failed outcomes.
    pub detail: Option<String>,

    /// Original event payload.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    fn build(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        outcome: WebhookOutcome,
        detail: Option<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            processed_at: Utc::now(),
            outcome,
            detail,
            payload,
        }
    }

    pub fn success(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::build(event_id, event_type, WebhookOutcome::Success, None, payload)
    }

    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::build(event_id, event_type, WebhookOutcome::Ignored, Some(reason.into()), payload)
    }

    pub fn anomaly(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        kind: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::build(event_id, event_type, WebhookOutcome::Anomaly, Some(kind.into()), payload)
    }

    pub fn failed(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        error: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::build(event_id, event_type, WebhookOutcome::Failed, Some(error.into()), payload)
    }
}

/// Result of attempting to save a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was written (new event, or replacing a failed attempt).
    Inserted,
    /// Record already exists (duplicate event).
    AlreadyExists,
}

/// Port for storing and retrieving processed webhook events.
///
/// Implementations key records by `event_id`. Saving over a final outcome is
/// a no-op reporting `AlreadyExists`; a `Failed` record is replaced.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    async fn find_by_event_id(&self, event_id: &str)
        -> Result<Option<WebhookEventRecord>, DomainError>;

    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;
}
