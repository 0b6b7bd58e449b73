//! Access decisions for protected course content.

use serde::{Deserialize, Serialize};

use super::Enrollment;

/// Site root, where unauthenticated viewers are sent.
pub const SITE_ROOT: &str = "/";

/// Why a viewer may not load a course's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No viewer identity on the request.
    Unauthenticated,
    /// The viewer has no profile record.
    NoProfile,
    /// No enrollment for this viewer and course.
    NotEnrolled,
}

impl DenialReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenialReason::Unauthenticated => "unauthenticated",
            DenialReason::NoProfile => "no_profile",
            DenialReason::NotEnrolled => "not_enrolled",
        }
    }

    /// Get a user-facing message for the denial reason.
    pub fn user_message(&self) -> &'static str {
        match self {
            DenialReason::Unauthenticated => "Sign in to view this course.",
            DenialReason::NoProfile => "Finish setting up your profile to view this course.",
            DenialReason::NotEnrolled => "Enroll in this course to view its content.",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

/// Outcome of an access check.
///
/// Denial is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Authorized { enrollment: Enrollment },
    Denied { reason: DenialReason, redirect: String },
}

impl AccessDecision {
    pub fn denied(reason: DenialReason, redirect: impl Into<String>) -> Self {
        AccessDecision::Denied {
            reason,
            redirect: redirect.into(),
        }
    }

    pub fn is_authorized(&self) -> bool {
        matches!(self, AccessDecision::Authorized { .. })
    }

    pub fn reason(&self) -> Option<DenialReason> {
        match self {
            AccessDecision::Authorized { .. } => None,
            AccessDecision::Denied { reason, .. } => Some(*reason),
        }
    }

    /// Where the caller should send a denied viewer.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            AccessDecision::Authorized { .. } => None,
            AccessDecision::Denied { redirect, .. } => Some(redirect),
        }
    }
}
