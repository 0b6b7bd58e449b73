//! HTTP DTOs (Data Transfer Objects) for enrollment endpoints.
//!
//! These types define the JSON request/response structure for the enrollment API.
//! They serve as the boundary between HTTP and the application layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::enrollment::CheckoutOutcome;
use crate::domain::enrollment::{AccessDecision, Enrollment};
use crate::domain::foundation::CourseId;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start checkout for a course.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub course_id: CourseId,
    /// Used to provision the profile and pre-fill the checkout form.
    #[serde(default)]
    pub email: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Where the client should navigate after checkout initiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub redirect_url: String,
    /// `in_app` or `provider_checkout`.
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl From<CheckoutOutcome> for CheckoutResponse {
    fn from(outcome: CheckoutOutcome) -> Self {
        Self {
            redirect_url: outcome.redirect.url().to_string(),
            kind: outcome.redirect.kind().to_string(),
            session_id: outcome.redirect.session_id().map(str::to_string),
        }
    }
}

/// Access gate decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessResponse {
    pub authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl From<AccessDecision> for AccessResponse {
    fn from(decision: AccessDecision) -> Self {
        Self {
            authorized: decision.is_authorized(),
            reason: decision.reason().map(|r| r.as_str().to_string()),
            redirect: decision.redirect().map(str::to_string),
        }
    }
}

/// A single enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentResponse {
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub payment_id: String,
    pub amount: Decimal,
    pub is_free: bool,
    /// ISO 8601.
    pub enrolled_at: String,
}

impl From<&Enrollment> for EnrollmentResponse {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: enrollment.id().to_string(),
            student_id: enrollment.student_id().to_string(),
            course_id: enrollment.course_id().to_string(),
            payment_id: enrollment.payment_id().to_string(),
            amount: enrollment.amount(),
            is_free: enrollment.is_free(),
            enrolled_at: enrollment.enrolled_at().as_datetime().to_rfc3339(),
        }
    }
}

/// A student's enrollments, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentListResponse {
    pub enrollments: Vec<EnrollmentResponse>,
}

/// Webhook acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub received: bool,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
        }
    }

    /// Error without a code, as the webhook endpoint returns.
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::enrollment::RedirectTarget;
    use crate::domain::enrollment::{DenialReason, SITE_ROOT};
    use crate::domain::foundation::StudentId;
    use rust_decimal_macros::dec;

    #[test]
    fn checkout_request_email_is_optional() {
        let id = CourseId::new();
        let json = format!(r#"{{"course_id":"{}"}}"#, id);

        let request: CheckoutRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(request.course_id, id);
        assert!(request.email.is_none());
    }

    #[test]
    fn provider_checkout_response_includes_session_id() {
        let outcome = CheckoutOutcome {
            redirect: RedirectTarget::ProviderCheckout {
                url: "https://checkout.stripe.test/c/pay/cs_1".to_string(),
                session_id: "cs_1".to_string(),
            },
            enrollment: None,
        };

        let json = serde_json::to_value(CheckoutResponse::from(outcome)).unwrap();

        assert_eq!(json["kind"], "provider_checkout");
        assert_eq!(json["session_id"], "cs_1");
    }

    #[test]
    fn in_app_response_omits_session_id() {
        let outcome = CheckoutOutcome {
            redirect: RedirectTarget::InApp {
                path: "/courses/rust-101".to_string(),
            },
            enrollment: None,
        };

        let json = serde_json::to_value(CheckoutResponse::from(outcome)).unwrap();

        assert_eq!(json["redirect_url"], "/courses/rust-101");
        assert!(json.get("session_id").is_none());
    }

    #[test]
    fn denied_access_response_carries_reason_and_redirect() {
        let response = AccessResponse::from(AccessDecision::denied(
            DenialReason::Unauthenticated,
            SITE_ROOT,
        ));

        assert!(!response.authorized);
        assert_eq!(response.reason.as_deref(), Some("unauthenticated"));
        assert_eq!(response.redirect.as_deref(), Some("/"));
    }

    #[test]
    fn enrollment_response_reports_free_flag() {
        let enrollment = Enrollment::new(StudentId::new(), CourseId::new(), "cs_1", dec!(49.99)).unwrap();

        let response = EnrollmentResponse::from(&enrollment);

        assert_eq!(response.amount, dec!(49.99));
        assert!(!response.is_free);
        assert_eq!(response.payment_id, "cs_1");
    }

    #[test]
    fn error_response_without_code_omits_field() {
        let json = serde_json::to_value(ErrorResponse::message("bad signature")).unwrap();

        assert_eq!(json["error"], "bad signature");
        assert!(json.get("code").is_none());
    }
}
