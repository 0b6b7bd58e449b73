//! Enrollment domain module.
//!
//! Handles the enrollment record, price conversion, checkout intent metadata,
//! reconciliation anomalies and access decisions.
//!
//! # Module Structure
//!
//! - `aggregate` - Enrollment entity and fulfillment validation
//! - `money` - Decimal price to minor-unit conversion
//! - `checkout_intent` - Intent metadata embedded in provider sessions
//! - `course` - Course and profile views owned by collaborators
//! - `anomaly` - Conflicts between stored rows and new claims
//! - `access` - Access gate decisions
//! - `errors` - EnrollmentError

mod access;
mod aggregate;
mod anomaly;
mod checkout_intent;
mod course;
mod errors;
pub mod money;

pub use access::{AccessDecision, DenialReason, SITE_ROOT};
pub use aggregate::{validate_fulfillment, Enrollment, FREE_PAYMENT_ID};
pub use anomaly::{AnomalyKind, ReconciliationAnomaly};
pub use checkout_intent::{
    CheckoutIntent, IntentMetadataError, METADATA_COURSE_ID, METADATA_PRICE_AT_TIME,
    METADATA_STUDENT_ID,
};
pub use course::{course_path, CourseReference, StudentProfile};
pub use errors::EnrollmentError;
