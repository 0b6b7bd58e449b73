//! HTTP middleware and extractors.

pub mod auth;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth, STUDENT_ID_HEADER};
