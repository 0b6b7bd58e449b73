//! Checkout intent carried through the provider as session metadata.
//!
//! The intent is never persisted locally. It is written into the checkout
//! session at initiation and read back from the verified webhook, so
//! fulfillment does not depend on course state that may have changed since.

use std::collections::HashMap;

use thiserror::Error;

use crate::domain::foundation::{CourseId, StudentId};

pub const METADATA_STUDENT_ID: &str = "student_id";
pub const METADATA_COURSE_ID: &str = "course_id";
pub const METADATA_PRICE_AT_TIME: &str = "price_at_time";

/// Errors reading an intent back out of session metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentMetadataError {
    #[error("missing metadata key '{0}'")]
    Missing(&'static str),

    #[error("invalid metadata value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// `(student, course, price snapshot)` for one checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutIntent {
    pub student_id: StudentId,
    pub course_id: CourseId,
    /// Price at initiation, in minor units. Absent on sessions that predate it.
    pub price_at_time: Option<i64>,
}

impl CheckoutIntent {
    pub fn new(student_id: StudentId, course_id: CourseId, price_minor: i64) -> Self {
        Self {
            student_id,
            course_id,
            price_at_time: Some(price_minor),
        }
    }

    /// Flattens the intent into string metadata for the provider.
    pub fn to_metadata(&self) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert(METADATA_STUDENT_ID.to_string(), self.student_id.to_string());
        metadata.insert(METADATA_COURSE_ID.to_string(), self.course_id.to_string());
        if let Some(price) = self.price_at_time {
            metadata.insert(METADATA_PRICE_AT_TIME.to_string(), price.to_string());
        }
        metadata
    }

    /// Reads the intent back from provider metadata.
    ///
    /// Student and course are required. A malformed price snapshot is an
    /// error; an absent one is not.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Result<Self, IntentMetadataError> {
        let student_id = required(metadata, METADATA_STUDENT_ID)?
            .parse::<StudentId>()
            .map_err(|e| IntentMetadataError::Invalid {
                key: METADATA_STUDENT_ID,
                reason: e.to_string(),
            })?;
        let course_id = required(metadata, METADATA_COURSE_ID)?
            .parse::<CourseId>()
            .map_err(|e| IntentMetadataError::Invalid {
                key: METADATA_COURSE_ID,
                reason: e.to_string(),
            })?;
        let price_at_time = match metadata.get(METADATA_PRICE_AT_TIME) {
            Some(raw) => Some(raw.trim().parse::<i64>().map_err(|e| {
                IntentMetadataError::Invalid {
                    key: METADATA_PRICE_AT_TIME,
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            student_id,
            course_id,
            price_at_time,
        })
    }
}

fn required<'a>(
    metadata: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, IntentMetadataError> {
    metadata
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or(IntentMetadataError::Missing(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_contains_all_keys() {
        let intent = CheckoutIntent::new(StudentId::new(), CourseId::new(), 4999);
        let metadata = intent.to_metadata();
        assert_eq!(metadata.len(), 3);
        assert_eq!(metadata.get(METADATA_PRICE_AT_TIME).unwrap(), "4999");
    }

    #[test]
    fn intent_reads_back_from_metadata() {
        let intent = CheckoutIntent::new(StudentId::new(), CourseId::new(), 4999);
        let parsed = CheckoutIntent::from_metadata(&intent.to_metadata()).unwrap();
        assert_eq!(parsed, intent);
    }

    #[test]
    fn price_snapshot_is_optional() {
        let mut metadata = CheckoutIntent::new(StudentId::new(), CourseId::new(), 1).to_metadata();
        metadata.remove(METADATA_PRICE_AT_TIME);
        let parsed = CheckoutIntent::from_metadata(&metadata).unwrap();
        assert_eq!(parsed.price_at_time, None);
    }

    #[test]
    fn missing_student_is_reported() {
        let mut metadata = HashMap::new();
        metadata.insert(METADATA_COURSE_ID.to_string(), CourseId::new().to_string());
        assert_eq!(
            CheckoutIntent::from_metadata(&metadata),
            Err(IntentMetadataError::Missing(METADATA_STUDENT_ID))
        );
    }

    #[test]
    fn blank_course_counts_as_missing() {
        let mut metadata = HashMap::new();
        metadata.insert(METADATA_STUDENT_ID.to_string(), StudentId::new().to_string());
        metadata.insert(METADATA_COURSE_ID.to_string(), " ".to_string());
        assert_eq!(
            CheckoutIntent::from_metadata(&metadata),
            Err(IntentMetadataError::Missing(METADATA_COURSE_ID))
        );
    }

    #[test]
    fn malformed_uuid_is_invalid() {
        let mut metadata = HashMap::new();
        metadata.insert(METADATA_STUDENT_ID.to_string(), "user_123".to_string());
        metadata.insert(METADATA_COURSE_ID.to_string(), CourseId::new().to_string());
        assert!(matches!(
            CheckoutIntent::from_metadata(&metadata),
            Err(IntentMetadataError::Invalid { key: METADATA_STUDENT_ID, .. })
        ));
    }
}
