//! HTTP adapters - REST API implementations.

pub mod enrollment;
pub mod middleware;

// Re-export key types for convenience
pub use enrollment::enrollment_router;
pub use enrollment::EnrollmentAppState;
