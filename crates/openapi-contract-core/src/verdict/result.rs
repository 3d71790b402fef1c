//! Outcome of checking one response against a contract

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::FailureKind;

/// Result of validating a single response.
///
/// `matched_path` is set whenever a path template was resolved, including
/// on failures past path resolution, so coverage can still be attributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationVerdict {
    valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    matched_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kind: Option<FailureKind>,
}

impl ValidationVerdict {
    #[must_use]
    pub fn success(matched_path: impl Into<String>) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            matched_path: Some(matched_path.into()),
            kind: None,
        }
    }

    #[must_use]
    pub fn failure(kind: FailureKind, errors: Vec<String>, matched_path: Option<String>) -> Self {
        Self {
            valid: false,
            errors,
            matched_path,
            kind: Some(kind),
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn matched_path(&self) -> Option<&str> {
        self.matched_path.as_deref()
    }

    /// Failure classification, `None` for a passing verdict.
    #[must_use]
    pub const fn kind(&self) -> Option<FailureKind> {
        self.kind
    }

    /// All errors joined by newlines, suitable for an assertion message.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.errors.join("\n")
    }
}
