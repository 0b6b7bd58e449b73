//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod enrollment;

pub use enrollment::{
    // Commands
    FulfillEnrollmentCommand, FulfillEnrollmentHandler, FulfillmentOutcome,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    InitiateCheckoutCommand, InitiateCheckoutHandler, CheckoutOutcome, CheckoutSettings,
    RedirectTarget,
    // Queries
    CheckCourseAccessHandler, CheckCourseAccessQuery,
    ListStudentEnrollmentsHandler, ListStudentEnrollmentsQuery,
    DEFAULT_STORE_TIMEOUT,
};
