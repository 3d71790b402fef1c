//! JSON Schema evaluation
//!
//! The validator only hands (instance, Draft-07 schema) pairs to a
//! [`SchemaEngine`]; the default engine is the `jsonschema` crate.

use serde_json::Value;

/// One structural violation reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON Pointer into the validated instance (`/` for the root)
    pub pointer: String,
    pub message: String,
}

impl SchemaViolation {
    #[must_use]
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        let pointer = pointer.into();
        Self {
            pointer: if pointer.is_empty() {
                "/".to_string()
            } else {
                pointer
            },
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.pointer, self.message)
    }
}

/// Evaluates an instance against a Draft-07 schema.
pub trait SchemaEngine {
    /// Return violations in evaluation order.
    ///
    /// At most `max_errors` are returned (0 = unlimited); with
    /// `stop_at_first_error` evaluation ends after the first one.
    fn validate(
        &self,
        instance: &Value,
        schema: &Value,
        max_errors: usize,
        stop_at_first_error: bool,
    ) -> Vec<SchemaViolation>;
}

/// Draft-07 evaluation backed by the `jsonschema` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl SchemaEngine for JsonSchemaEngine {
    fn validate(
        &self,
        instance: &Value,
        schema: &Value,
        max_errors: usize,
        stop_at_first_error: bool,
    ) -> Vec<SchemaViolation> {
        let validator = match jsonschema::draft7::new(schema) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "response schema rejected by engine");
                return vec![SchemaViolation::new(
                    "/",
                    format!("Response schema is not a valid JSON Schema: {e}"),
                )];
            }
        };

        let limit = match (stop_at_first_error, max_errors) {
            (true, _) => 1,
            (false, 0) => usize::MAX,
            (false, n) => n,
        };

        validator
            .iter_errors(instance)
            .take(limit)
            .map(|e| SchemaViolation::new(e.instance_path().to_string(), e.to_string()))
            .collect()
    }
}
