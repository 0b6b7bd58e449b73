//! Axum router configuration for enrollment endpoints.
//!
//! This module defines the route structure for enrollment-related API endpoints
//! and wires them to their corresponding handlers.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::access_guard::require_course_access;
use super::handlers::{
    check_course_access, get_course_enrollment, handle_stripe_webhook, health,
    initiate_checkout, list_enrollments, EnrollmentAppState,
};

/// Routes for students and the access gate.
///
/// # Routes
/// - `POST /checkout` - Start checkout (requires identity)
/// - `GET /enrollments` - List the student's enrollments (requires identity)
/// - `GET /courses/:course_id/access` - Access decision (identity optional)
pub fn enrollment_routes() -> Router<EnrollmentAppState> {
    Router::new()
        .route("/checkout", post(initiate_checkout))
        .route("/enrollments", get(list_enrollments))
        .route("/courses/:course_id/access", get(check_course_access))
}

/// Protected course content, guarded by the access gate.
///
/// # Routes
/// - `GET /courses/:course_id/enrollment` - The authorizing enrollment
pub fn protected_course_routes(state: EnrollmentAppState) -> Router<EnrollmentAppState> {
    Router::new()
        .route("/courses/:course_id/enrollment", get(get_course_enrollment))
        .route_layer(middleware::from_fn_with_state(state, require_course_access))
}

/// Create the Stripe webhook router.
///
/// This is separate from the student routes because webhooks
/// don't carry student identity (they're verified via signature).
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<EnrollmentAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Create the complete enrollment router with state applied.
///
/// # Example
///
/// ```ignore
/// let app = enrollment_router(state).layer(TraceLayer::new_for_http());
/// ```
pub fn enrollment_router(state: EnrollmentAppState) -> Router {
    let api = Router::new()
        .merge(enrollment_routes())
        .merge(protected_course_routes(state.clone()))
        .nest("/webhooks", webhook_routes());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
}
