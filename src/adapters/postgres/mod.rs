//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresEnrollmentStore` - Enrollment rows with atomic insert-if-absent
//! - `PostgresCourseCatalog` - Course lookups
//! - `PostgresProfileDirectory` - Profile lookup and provisioning
//! - `PostgresWebhookEventRepository` - Processed webhook event log
//! - `PostgresReconciliationLog` - Reconciliation anomaly queue

mod course_catalog;
mod enrollment_store;
mod profile_directory;
mod reconciliation_log;
mod webhook_event_repository;

pub use course_catalog::PostgresCourseCatalog;
pub use enrollment_store::PostgresEnrollmentStore;
pub use profile_directory::PostgresProfileDirectory;
pub use reconciliation_log::PostgresReconciliationLog;
pub use webhook_event_repository::PostgresWebhookEventRepository;
