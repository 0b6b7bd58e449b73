//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - axum REST API
//! - `postgres` - PostgreSQL persistence
//! - `stripe` - Stripe checkout and webhooks
//! - `memory` - In-memory stores for tests and local runs

pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use self::http::{enrollment_router, EnrollmentAppState};
