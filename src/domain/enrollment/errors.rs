//! Enrollment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | CourseNotFound | 404 |
//! | IncompleteCourseData | 422 |
//! | PaymentReferenceInUse | 409 |
//! | StoreUnavailable | 503 |
//! | ProviderUnavailable | 503 |
//! | ProviderRejected | 502 |

use thiserror::Error;

use crate::domain::foundation::{CourseId, DomainError, ErrorCode, ValidationError};

/// Failures of the fulfillment, checkout and access operations.
///
/// "Not enrolled" and "not found" lookups are results, not errors; only
/// missing courses at checkout are reported here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentError {
    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),

    #[error("Course data is incomplete: {0}")]
    IncompleteCourseData(String),

    #[error("Payment reference '{0}' is already bound to another enrollment")]
    PaymentReferenceInUse(String),

    #[error("Enrollment store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Payment provider rejected the request: {0}")]
    ProviderRejected(String),
}

impl EnrollmentError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EnrollmentError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn store_unavailable(message: impl Into<String>) -> Self {
        EnrollmentError::StoreUnavailable(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            EnrollmentError::Validation { .. } => ErrorCode::ValidationFailed,
            EnrollmentError::CourseNotFound(_) => ErrorCode::CourseNotFound,
            EnrollmentError::IncompleteCourseData(_) => ErrorCode::IncompleteCourseData,
            EnrollmentError::PaymentReferenceInUse(_) => ErrorCode::PaymentReferenceInUse,
            EnrollmentError::StoreUnavailable(_) => ErrorCode::DatabaseError,
            EnrollmentError::ProviderUnavailable(_) => ErrorCode::PaymentProviderUnavailable,
            EnrollmentError::ProviderRejected(_) => ErrorCode::PaymentProviderError,
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EnrollmentError::StoreUnavailable(_) | EnrollmentError::ProviderUnavailable(_)
        )
    }
}

impl From<ValidationError> for EnrollmentError {
    fn from(err: ValidationError) -> Self {
        EnrollmentError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for EnrollmentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed => EnrollmentError::Validation {
                field: err.detail("field").unwrap_or("unknown").to_string(),
                message: err.message,
            },
            ErrorCode::PaymentReferenceInUse => EnrollmentError::PaymentReferenceInUse(
                err.detail("payment_id").unwrap_or_default().to_string(),
            ),
            ErrorCode::IncompleteCourseData => EnrollmentError::IncompleteCourseData(err.message),
            ErrorCode::PaymentProviderUnavailable => EnrollmentError::ProviderUnavailable(err.message),
            ErrorCode::PaymentProviderError => EnrollmentError::ProviderRejected(err.message),
            _ => EnrollmentError::StoreUnavailable(err.to_string()),
        }
    }
}

impl From<EnrollmentError> for DomainError {
    fn from(err: EnrollmentError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
