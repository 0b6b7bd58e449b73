//! HTTP handlers for enrollment endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Extension, Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::enrollment::{
    CheckCourseAccessHandler, CheckCourseAccessQuery, CheckoutSettings, FulfillEnrollmentHandler,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, InitiateCheckoutCommand,
    InitiateCheckoutHandler, ListStudentEnrollmentsHandler, ListStudentEnrollmentsQuery,
    DEFAULT_STORE_TIMEOUT,
};
use crate::domain::enrollment::{Enrollment, EnrollmentError};
use crate::domain::foundation::CourseId;
use crate::domain::payment::WebhookError;
use crate::ports::{
    CourseCatalog, EnrollmentStore, PaymentProvider, ProfileDirectory, ReconciliationLog,
    WebhookEventRepository,
};

use super::super::middleware::{OptionalAuth, RequireAuth};
use super::dto::{
    AccessResponse, CheckoutRequest, CheckoutResponse, EnrollmentListResponse, EnrollmentResponse,
    ErrorResponse, WebhookAckResponse,
};

/// Header carrying the provider's webhook signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped dependencies
/// for efficient sharing across handlers.
#[derive(Clone)]
pub struct EnrollmentAppState {
    pub enrollment_store: Arc<dyn EnrollmentStore>,
    pub course_catalog: Arc<dyn CourseCatalog>,
    pub profile_directory: Arc<dyn ProfileDirectory>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub reconciliation_log: Arc<dyn ReconciliationLog>,
    pub webhook_events: Arc<dyn WebhookEventRepository>,
    pub checkout_settings: CheckoutSettings,
    pub store_timeout: Duration,
}

impl EnrollmentAppState {
    pub fn new(
        enrollment_store: Arc<dyn EnrollmentStore>,
        course_catalog: Arc<dyn CourseCatalog>,
        profile_directory: Arc<dyn ProfileDirectory>,
        payment_provider: Arc<dyn PaymentProvider>,
        reconciliation_log: Arc<dyn ReconciliationLog>,
        webhook_events: Arc<dyn WebhookEventRepository>,
        checkout_settings: CheckoutSettings,
    ) -> Self {
        Self {
            enrollment_store,
            course_catalog,
            profile_directory,
            payment_provider,
            reconciliation_log,
            webhook_events,
            checkout_settings,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Create handlers on demand from the shared state.
    pub fn fulfill_handler(&self) -> Arc<FulfillEnrollmentHandler> {
        Arc::new(
            FulfillEnrollmentHandler::new(
                self.enrollment_store.clone(),
                self.reconciliation_log.clone(),
            )
            .with_store_timeout(self.store_timeout),
        )
    }

    pub fn checkout_handler(&self) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(
            self.course_catalog.clone(),
            self.profile_directory.clone(),
            self.enrollment_store.clone(),
            self.payment_provider.clone(),
            self.fulfill_handler(),
            self.checkout_settings.clone(),
        )
        .with_store_timeout(self.store_timeout)
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.payment_provider.clone(),
            self.fulfill_handler(),
            self.webhook_events.clone(),
        )
    }

    pub fn access_handler(&self) -> CheckCourseAccessHandler {
        CheckCourseAccessHandler::new(
            self.enrollment_store.clone(),
            self.profile_directory.clone(),
            self.course_catalog.clone(),
        )
        .with_store_timeout(self.store_timeout)
    }

    pub fn list_handler(&self) -> ListStudentEnrollmentsHandler {
        ListStudentEnrollmentsHandler::new(self.enrollment_store.clone())
            .with_store_timeout(self.store_timeout)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/courses/:course_id/access - Access gate decision for the viewer
pub async fn check_course_access(
    State(state): State<EnrollmentAppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(course_id): Path<CourseId>,
) -> Result<impl IntoResponse, EnrollmentApiError> {
    let handler = state.access_handler();
    let query = CheckCourseAccessQuery { viewer, course_id };

    let decision = handler.handle(query).await?;

    Ok(Json(AccessResponse::from(decision)))
}

/// GET /api/courses/:course_id/enrollment - Protected course content
///
/// Only reachable through `require_course_access`, which supplies the
/// enrollment that authorized the request.
pub async fn get_course_enrollment(
    Extension(enrollment): Extension<Enrollment>,
) -> impl IntoResponse {
    Json(EnrollmentResponse::from(&enrollment))
}

/// GET /api/enrollments - The authenticated student's enrollments
pub async fn list_enrollments(
    State(state): State<EnrollmentAppState>,
    RequireAuth(student_id): RequireAuth,
) -> Result<impl IntoResponse, EnrollmentApiError> {
    let handler = state.list_handler();
    let query = ListStudentEnrollmentsQuery { student_id };

    let enrollments = handler.handle(query).await?;

    Ok(Json(EnrollmentListResponse {
        enrollments: enrollments.iter().map(EnrollmentResponse::from).collect(),
    }))
}

/// GET /health - Liveness
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout - Free enrollment or provider checkout redirect
pub async fn initiate_checkout(
    State(state): State<EnrollmentAppState>,
    RequireAuth(student_id): RequireAuth,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, EnrollmentApiError> {
    let handler = state.checkout_handler();
    let cmd = InitiateCheckoutCommand {
        student_id,
        course_id: request.course_id,
        email: request.email,
    };

    let outcome = handler.handle(cmd).await?;

    Ok(Json(CheckoutResponse::from(outcome)))
}

/// POST /api/webhooks/stripe - Handle Stripe webhook events
///
/// The body is taken as raw bytes; the signature covers them exactly.
pub async fn handle_stripe_webhook(
    State(state): State<EnrollmentAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let handler = state.webhook_handler();
    let cmd = HandlePaymentWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match handler.handle(cmd).await {
        Ok(result) => {
            tracing::debug!(?result, "Webhook acknowledged");
            (StatusCode::OK, Json(WebhookAckResponse { received: true })).into_response()
        }
        Err(e) => webhook_error_response(&e),
    }
}

fn webhook_error_response(err: &WebhookError) -> Response {
    let message = match err {
        WebhookError::StoreUnavailable(_) => "Temporarily unable to process event".to_string(),
        other => other.to_string(),
    };
    (err.status_code(), Json(ErrorResponse::message(message))).into_response()
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts enrollment errors to HTTP responses.
#[derive(Debug)]
pub struct EnrollmentApiError(pub(crate) EnrollmentError);

impl From<EnrollmentError> for EnrollmentApiError {
    fn from(err: EnrollmentError) -> Self {
        Self(err)
    }
}

impl IntoResponse for EnrollmentApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EnrollmentError::Validation { .. } => StatusCode::BAD_REQUEST,
            EnrollmentError::CourseNotFound(_) => StatusCode::NOT_FOUND,
            EnrollmentError::IncompleteCourseData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EnrollmentError::PaymentReferenceInUse(_) => StatusCode::CONFLICT,
            EnrollmentError::StoreUnavailable(_) | EnrollmentError::ProviderUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EnrollmentError::ProviderRejected(_) => StatusCode::BAD_GATEWAY,
        };

        // Infrastructure detail stays in the logs
        let message = match &self.0 {
            EnrollmentError::StoreUnavailable(detail) => {
                tracing::error!(error = %detail, "Enrollment store unavailable");
                "Service temporarily unavailable".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse::new(self.0.code().to_string(), message);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: EnrollmentError) -> StatusCode {
        EnrollmentApiError(err).into_response().status()
    }

    #[test]
    fn enrollment_errors_map_to_status_codes() {
        assert_eq!(status_of(EnrollmentError::validation("amount", "negative")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(EnrollmentError::CourseNotFound(CourseId::new())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(EnrollmentError::IncompleteCourseData("missing slug".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(EnrollmentError::PaymentReferenceInUse("cs_1".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EnrollmentError::store_unavailable("timeout")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(EnrollmentError::ProviderUnavailable("503".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(EnrollmentError::ProviderRejected("bad request".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn webhook_errors_map_to_status_codes() {
        let bad_sig = webhook_error_response(&WebhookError::SignatureVerificationFailed("x".into()));
        let outage = webhook_error_response(&WebhookError::StoreUnavailable("down".into()));

        assert_eq!(bad_sig.status(), StatusCode::BAD_REQUEST);
        assert_eq!(outage.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
