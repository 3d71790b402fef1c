//! Interchange types: recorded HTTP exchanges in, coverage summaries out
//!
//! A test harness (or a traffic recorder) writes one [`Exchange`] per line
//! as JSONL; the CLI replays them against the contracts. JSON Schemas for
//! both formats are exported with [`generate_schema`] and
//! [`generate_report_schema`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::coverage::CoverageSummary;

/// One observed request/response pair, as captured by a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Exchange {
    /// Contract to check against (falls back to the configured default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    /// HTTP method of the request
    pub method: String,
    /// Request path as sent, without query string
    pub path: String,
    /// Response status code
    pub status_code: u16,
    /// Response `Content-Type` header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Raw response body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Exchange {
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>, status_code: u16) -> Self {
        Self {
            spec: None,
            method: method.into(),
            path: path.into(),
            status_code,
            content_type: None,
            body: None,
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn with_spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = Some(spec.into());
        self
    }

    /// Content type, treating an empty header as absent.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref().filter(|ct| !ct.is_empty())
    }

    /// Decode the body as JSON for schema validation.
    ///
    /// An empty body, or a body served with a non-JSON content type, yields
    /// `None` so the validator can decide whether the contract requires one.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::InvalidJson`] if the body should be JSON but does not parse.
    pub fn json_body(&self) -> Result<Option<serde_json::Value>, ExchangeError> {
        let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) else {
            return Ok(None);
        };

        if let Some(ct) = self.content_type() {
            if !ct.to_ascii_lowercase().contains("json") {
                return Ok(None);
            }
        }

        serde_json::from_str(body).map(Some).map_err(|e| {
            let hint = if self.content_type().is_none() {
                " (no Content-Type header was present on the response)"
            } else {
                ""
            };
            ExchangeError::InvalidJson(format!("{e}{hint}"))
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Response body could not be parsed as JSON: {0}")]
    InvalidJson(String),
}

/// JSON Schema for a recorded [`Exchange`] line.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(Exchange);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}

/// JSON Schema for the [`CoverageSummary`] report.
#[must_use]
pub fn generate_report_schema() -> String {
    let schema = schemars::schema_for!(CoverageSummary);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
