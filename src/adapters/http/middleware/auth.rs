//! Student identity extractors for axum.
//!
//! This module provides:
//! - `RequireAuth` - Extractor that requires a student identity
//! - `OptionalAuth` - Extractor for routes that also serve anonymous viewers
//!
//! The identity is the student's UUID in the `X-User-Id` header, set by the
//! upstream session layer. Identity is always passed explicitly into the
//! application handlers; nothing below this module reads request state.
//!
//! ```text
//! X-User-Id: 1f0e...  →  RequireAuth(StudentId)  →  handler command/query
//! ```

use axum::{
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::StudentId;

/// Header carrying the authenticated student's id.
pub const STUDENT_ID_HEADER: &str = "X-User-Id";

fn student_id_from(parts: &Parts) -> Option<StudentId> {
    parts
        .headers
        .get(STUDENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Extractor that requires a student identity.
///
/// Missing or malformed ids are rejected with 401.
///
/// # Example
///
/// ```ignore
/// async fn my_handler(RequireAuth(student_id): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", student_id)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAuth(pub StudentId);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            student_id_from(parts)
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Extractor for optional identity.
///
/// Returns `None` for anonymous requests and for unparseable ids; the access
/// gate treats both as unauthenticated.
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuth(pub Option<StudentId>);

impl<S> axum::extract::FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move { Ok(OptionalAuth(student_id_from(parts))) })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    /// No valid student identity was provided.
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": "UNAUTHENTICATED"
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRequestParts;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = header {
            builder = builder.header(STUDENT_ID_HEADER, value);
        }
        let (parts, _body) = builder.body(()).unwrap().into_parts();
        parts
    }

    // ════════════════════════════════════════════════════════════════════════════
    // RequireAuth Extractor Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn require_auth_extracts_student_id() {
        let student = StudentId::new();
        let mut parts = parts_with(Some(&student.to_string()));

        let RequireAuth(extracted) = RequireAuth::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(extracted, student);
    }

    #[tokio::test]
    async fn require_auth_fails_without_header() {
        let mut parts = parts_with(None);

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[tokio::test]
    async fn require_auth_fails_for_non_uuid() {
        let mut parts = parts_with(Some("user-123"));

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // OptionalAuth Extractor Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn optional_auth_returns_some_when_present() {
        let student = StudentId::new();
        let mut parts = parts_with(Some(&student.to_string()));

        let OptionalAuth(viewer) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(viewer, Some(student));
    }

    #[tokio::test]
    async fn optional_auth_returns_none_when_absent() {
        let mut parts = parts_with(None);

        let OptionalAuth(viewer) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();

        assert!(viewer.is_none());
    }

    #[test]
    fn auth_rejection_returns_401() {
        let response = AuthRejection::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
