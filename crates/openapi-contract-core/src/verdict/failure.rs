//! Failure classification for contract checks

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which step of the contract check rejected the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Request path matches no path template in the contract
    NoMatchingPath,
    /// Path template exists but does not declare the method
    MethodNotDefined,
    /// Operation does not declare the observed status code
    StatusCodeNotDefined,
    /// Non-JSON Content-Type not declared for the response
    ContentTypeNotDefined,
    /// A JSON schema is declared but no body was captured
    EmptyBody,
    /// Body does not satisfy the response schema
    SchemaViolation,
}

impl FailureKind {
    /// Whether the failure identified an endpoint that coverage can be attributed to.
    #[must_use]
    pub const fn has_matched_path(self) -> bool {
        !matches!(self, Self::NoMatchingPath)
    }

    /// Human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::NoMatchingPath => "Request path not declared in contract",
            Self::MethodNotDefined => "Method not declared for path",
            Self::StatusCodeNotDefined => "Status code not declared for operation",
            Self::ContentTypeNotDefined => "Content-Type not declared for response",
            Self::EmptyBody => "Response body missing but schema declared",
            Self::SchemaViolation => "Response body does not match schema",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}
