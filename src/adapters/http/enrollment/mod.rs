//! HTTP adapter for enrollment endpoints.
//!
//! Exposes the enrollment core via REST API:
//! - `POST /api/checkout` - Free enrollment or provider checkout redirect
//! - `POST /api/webhooks/stripe` - Handle Stripe webhooks
//! - `GET /api/courses/:course_id/access` - Access gate decision
//! - `GET /api/courses/:course_id/enrollment` - Guarded course content
//! - `GET /api/enrollments` - The student's enrollments
//! - `GET /health` - Liveness

pub mod access_guard;
pub mod dto;
pub mod handlers;
pub mod routes;

pub use access_guard::require_course_access;
pub use dto::*;
pub use handlers::{EnrollmentApiError, EnrollmentAppState, STRIPE_SIGNATURE_HEADER};
pub use routes::enrollment_router;
