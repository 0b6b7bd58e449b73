//! Access guard for protected course routes.
//!
//! Every protected route runs the access check before its handler. Denied
//! viewers are sent to the gate's redirect with `303 See Other`; a failed
//! check never falls through to the content.

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::application::handlers::enrollment::CheckCourseAccessQuery;
use crate::domain::enrollment::AccessDecision;
use crate::domain::foundation::CourseId;

use super::super::middleware::OptionalAuth;
use super::handlers::{EnrollmentApiError, EnrollmentAppState};

/// Middleware guarding routes with a `:course_id` path segment.
///
/// On success the authorizing `Enrollment` is placed in request extensions.
/// Apply with `route_layer` so the path is matched before the guard runs.
pub async fn require_course_access(
    State(state): State<EnrollmentAppState>,
    OptionalAuth(viewer): OptionalAuth,
    Path(course_id): Path<CourseId>,
    mut request: Request,
    next: Next,
) -> Response {
    let query = CheckCourseAccessQuery { viewer, course_id };

    match state.access_handler().handle(query).await {
        Ok(AccessDecision::Authorized { enrollment }) => {
            request.extensions_mut().insert(enrollment);
            next.run(request).await
        }
        Ok(AccessDecision::Denied { reason, redirect }) => {
            tracing::debug!(course_id = %course_id, reason = reason.as_str(), "Course access denied");
            (StatusCode::SEE_OTHER, [(header::LOCATION, redirect)]).into_response()
        }
        Err(e) => EnrollmentApiError::from(e).into_response(),
    }
}
