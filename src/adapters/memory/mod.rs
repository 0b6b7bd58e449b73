//! In-memory adapters.
//!
//! Backing stores for unit and integration tests. Not durable.

mod course_catalog;
mod enrollment_store;
mod profile_directory;
mod reconciliation_log;
mod webhook_event_repository;

pub use course_catalog::InMemoryCourseCatalog;
pub use enrollment_store::InMemoryEnrollmentStore;
pub use profile_directory::InMemoryProfileDirectory;
pub use reconciliation_log::InMemoryReconciliationLog;
pub use webhook_event_repository::InMemoryWebhookEventRepository;
