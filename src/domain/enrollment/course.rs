//! Read-only views of collaborator records: courses and student profiles.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CourseId, StudentId};

/// Course data consumed by checkout and the access gate.
///
/// The catalog owns this record. A missing `price` means the price was never
/// set, which is different from a price of zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseReference {
    pub id: CourseId,
    pub price: Option<Decimal>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
}

impl CourseReference {
    /// Creates a course with only an id and price; other fields unset.
    pub fn new(id: CourseId, price: Option<Decimal>) -> Self {
        Self {
            id,
            price,
            title: None,
            description: None,
            slug: None,
            image_url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Public page of the course, by slug when available.
    pub fn public_path(&self) -> String {
        course_path(self.slug.as_deref(), self.id)
    }

    /// Fields a paid checkout needs that are missing or blank.
    pub fn missing_checkout_fields(&self) -> Vec<&'static str> {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if blank(&self.title) {
            missing.push("title");
        }
        if blank(&self.description) {
            missing.push("description");
        }
        if blank(&self.slug) {
            missing.push("slug");
        }
        missing
    }
}

/// Builds `/courses/{slug}`, falling back to the course id.
pub fn course_path(slug: Option<&str>, course_id: CourseId) -> String {
    match slug.filter(|s| !s.trim().is_empty()) {
        Some(slug) => format!("/courses/{}", slug),
        None => format!("/courses/{}", course_id),
    }
}

/// A student's profile record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub id: StudentId,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl StudentProfile {
    pub fn new(id: StudentId, email: Option<String>) -> Self {
        Self {
            id,
            email,
            first_name: None,
            last_name: None,
            avatar_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn public_path_prefers_slug() {
        let course = CourseReference::new(CourseId::new(), Some(dec!(10))).with_slug("rust-101");
        assert_eq!(course.public_path(), "/courses/rust-101");
    }

    #[test]
    fn public_path_falls_back_to_id() {
        let id = CourseId::new();
        let course = CourseReference::new(id, None).with_slug("  ");
        assert_eq!(course.public_path(), format!("/courses/{}", id));
    }

    #[test]
    fn complete_course_has_no_missing_fields() {
        let course = CourseReference::new(CourseId::new(), Some(dec!(10)))
            .with_title("Rust")
            .with_description("Learn Rust")
            .with_slug("rust");
        assert!(course.missing_checkout_fields().is_empty());
    }

    #[test]
    fn blank_fields_are_reported_missing() {
        let course = CourseReference::new(CourseId::new(), Some(dec!(10))).with_title("");
        assert_eq!(
            course.missing_checkout_fields(),
            vec!["title", "description", "slug"]
        );
    }
}
