//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `EnrollmentStore` - Atomic insert-if-absent enrollment records
//! - `WebhookEventRepository` - Processed webhook event log
//! - `ReconciliationLog` - Billing discrepancy queue
//!
//! ## Collaborator Ports
//!
//! - `CourseCatalog` - Course lookups
//! - `ProfileDirectory` - Student profile lookup and provisioning
//! - `PaymentProvider` - Hosted checkout and webhook verification

mod course_catalog;
mod enrollment_store;
mod payment_provider;
mod profile_directory;
mod reconciliation_log;
mod webhook_event_repository;

pub use course_catalog::CourseCatalog;
pub use enrollment_store::{EnrollmentStore, InsertOutcome};
pub use payment_provider::{
    CheckoutLineItem, CheckoutSession, CheckoutSessionSummary, CreateCheckoutRequest, PaymentError,
    PaymentErrorCode, PaymentEvent, PaymentEventData, PaymentEventType, PaymentProvider,
    SessionPaymentStatus,
};
pub use profile_directory::ProfileDirectory;
pub use reconciliation_log::ReconciliationLog;
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookOutcome,
};
