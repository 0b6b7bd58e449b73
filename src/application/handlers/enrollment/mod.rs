//! Enrollment command and query handlers.
//!
//! Every store call is bounded by a per-handler timeout; an elapsed call is
//! reported as `EnrollmentError::StoreUnavailable`.
//!
//! # Commands
//!
//! - `FulfillEnrollmentHandler` - Idempotent enrollment creation
//! - `InitiateCheckoutHandler` - Free enrollment or provider checkout
//! - `HandlePaymentWebhookHandler` - Verified provider events
//!
//! # Queries
//!
//! - `CheckCourseAccessHandler` - Access gate for course content
//! - `ListStudentEnrollmentsHandler` - A student's enrollments

mod check_course_access;
mod fulfill_enrollment;
mod handle_payment_webhook;
mod initiate_checkout;
mod list_student_enrollments;
mod store_call;

pub use check_course_access::{CheckCourseAccessHandler, CheckCourseAccessQuery};
pub use fulfill_enrollment::{
    FulfillEnrollmentCommand, FulfillEnrollmentHandler, FulfillmentOutcome,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use initiate_checkout::{
    CheckoutOutcome, CheckoutSettings, InitiateCheckoutCommand, InitiateCheckoutHandler,
    RedirectTarget,
};
pub use list_student_enrollments::{ListStudentEnrollmentsHandler, ListStudentEnrollmentsQuery};
pub use store_call::DEFAULT_STORE_TIMEOUT;
