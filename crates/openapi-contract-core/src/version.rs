//! OpenAPI dialect detection

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// OpenAPI dialect a contract document is written in.
///
/// Anything that does not declare `3.1.x` is treated as 3.0.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum OpenApiVersion {
    /// OpenAPI 3.0 (`nullable`, no `prefixItems`)
    #[default]
    #[serde(rename = "3.0")]
    V3_0,
    /// OpenAPI 3.1 (JSON Schema 2020-12 vocabulary)
    #[serde(rename = "3.1")]
    V3_1,
}

impl OpenApiVersion {
    /// Detect the dialect from the document's top-level `openapi` field.
    #[must_use]
    pub fn from_document(document: &serde_json::Value) -> Self {
        match document.get("openapi").and_then(|v| v.as_str()) {
            Some(declared) if declared.starts_with("3.1") => Self::V3_1,
            _ => Self::V3_0,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V3_0 => "3.0",
            Self::V3_1 => "3.1",
        }
    }
}

impl std::fmt::Display for OpenApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
