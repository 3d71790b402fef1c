//! Response validation against a named contract
//!
//! [`ResponseValidator::validate`] resolves the operation a request
//! exercised, picks the response schema for the observed status and
//! content type, converts it to Draft-07 and hands the body to the
//! [`SchemaEngine`]. Contract mismatches come back as failing verdicts;
//! only an unusable contract store is an `Err`.

mod content;
mod lookup;

use serde_json::Value;

use openapi_contract_core::config::DEFAULT_MAX_ERRORS;
use openapi_contract_core::{
    CoverageStore, FailureKind, OpenApiVersion, PathMatcher, ValidationVerdict, convert_schema,
};

use crate::engine::{JsonSchemaEngine, SchemaEngine};
use crate::store::{SpecStore, StoreError};

use content::{is_json_media_type, normalize_media_type};

/// What the test observed for one request.
#[derive(Debug, Clone, Copy)]
pub struct ObservedResponse<'a> {
    pub method: &'a str,
    /// Concrete request path, without query string
    pub path: &'a str,
    pub status_code: u16,
    /// Decoded JSON body; `None` or JSON `null` means no body
    pub body: Option<&'a Value>,
    /// Response `Content-Type` header, parameters allowed
    pub content_type: Option<&'a str>,
}

impl<'a> ObservedResponse<'a> {
    #[must_use]
    pub fn new(method: &'a str, path: &'a str, status_code: u16) -> Self {
        Self {
            method,
            path,
            status_code,
            body: None,
            content_type: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

/// Checks observed responses against contracts held by a [`SpecStore`].
#[derive(Debug)]
pub struct ResponseValidator<'s, E = JsonSchemaEngine> {
    store: &'s SpecStore,
    engine: E,
    max_errors: usize,
}

impl<'s> ResponseValidator<'s> {
    #[must_use]
    pub fn new(store: &'s SpecStore) -> Self {
        Self {
            store,
            engine: JsonSchemaEngine,
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

impl<'s, E: SchemaEngine> ResponseValidator<'s, E> {
    /// Swap the schema engine.
    #[must_use]
    pub fn with_engine<F: SchemaEngine>(self, engine: F) -> ResponseValidator<'s, F> {
        ResponseValidator {
            store: self.store,
            engine,
            max_errors: self.max_errors,
        }
    }

    /// Cap on reported schema violations. 0 = unlimited, 1 = stop at the first.
    #[must_use]
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    #[must_use]
    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    /// Validate one response against `contract`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the contract cannot be loaded. Every
    /// mismatch with the contract is reported through the verdict.
    pub fn validate(
        &self,
        contract: &str,
        response: &ObservedResponse<'_>,
    ) -> Result<ValidationVerdict, StoreError> {
        let document = self.store.load(contract)?;
        let version = OpenApiVersion::from_document(&document);

        let templates = document
            .get("paths")
            .and_then(Value::as_object)
            .into_iter()
            .flat_map(|paths| paths.keys());
        let matcher = PathMatcher::new(templates, self.store.strip_prefixes());

        let Some(template) = matcher.find(response.path) else {
            tracing::debug!(contract, path = response.path, "no matching path template");
            return Ok(ValidationVerdict::failure(
                FailureKind::NoMatchingPath,
                vec![format!(
                    "No matching path found in '{contract}' spec for: {}",
                    response.path
                )],
                None,
            ));
        };
        let method = response.method.to_ascii_uppercase();
        let status = response.status_code;
        let fail = |kind: FailureKind, message: String| {
            Ok(ValidationVerdict::failure(
                kind,
                vec![message],
                Some(template.to_string()),
            ))
        };

        let Some(operation) = lookup::operation(&document, template, &method) else {
            return fail(
                FailureKind::MethodNotDefined,
                format!("Method not defined: {method} {template} in '{contract}' spec"),
            );
        };

        let Some(declared) = lookup::response(&document, operation, status) else {
            return fail(
                FailureKind::StatusCodeNotDefined,
                format!(
                    "Status code not defined: {status} for {method} {template} in '{contract}' spec"
                ),
            );
        };

        let Some(content) = declared.get("content").and_then(Value::as_object) else {
            tracing::debug!(contract, template, status, "response declares no content");
            return Ok(ValidationVerdict::success(template));
        };

        if let Some(observed) = response.content_type.filter(|ct| !ct.trim().is_empty()) {
            let normalized = normalize_media_type(observed);
            if !is_json_media_type(&normalized) {
                if content
                    .keys()
                    .any(|key| normalize_media_type(key) == normalized)
                {
                    return Ok(ValidationVerdict::success(template));
                }
                let defined: Vec<&str> = content.keys().map(String::as_str).collect();
                return fail(
                    FailureKind::ContentTypeNotDefined,
                    format!(
                        "Content-Type not defined: '{normalized}' for {method} {template} (status {status}) in '{contract}' spec. Defined content types: {}",
                        defined.join(", ")
                    ),
                );
            }
        }

        let Some((media_type, media)) = content
            .iter()
            .find(|(key, _)| is_json_media_type(&normalize_media_type(key)))
        else {
            tracing::debug!(contract, template, status, "no JSON media type declared");
            return Ok(ValidationVerdict::success(template));
        };

        let Some(schema) = media.get("schema") else {
            return Ok(ValidationVerdict::success(template));
        };

        let body = match response.body {
            None | Some(Value::Null) => {
                return fail(
                    FailureKind::EmptyBody,
                    format!(
                        "Response body is empty but {method} {template} (status {status}) defines a JSON schema in '{contract}' spec"
                    ),
                );
            }
            Some(body) => body,
        };

        let mut schema = convert_schema(&lookup::resolve_refs(schema, &document), version);
        lookup::attach_components(&mut schema, &document, version);
        let violations =
            self.engine
                .validate(body, &schema, self.max_errors, self.max_errors == 1);

        if violations.is_empty() {
            return Ok(ValidationVerdict::success(template));
        }

        tracing::debug!(
            contract,
            template,
            status,
            media_type = media_type.as_str(),
            violations = violations.len(),
            "response body violates schema"
        );
        Ok(ValidationVerdict::failure(
            FailureKind::SchemaViolation,
            violations.iter().map(ToString::to_string).collect(),
            Some(template.to_string()),
        ))
    }

    /// [`Self::validate`], then record coverage whenever a path template matched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the contract cannot be loaded.
    pub fn validate_and_record(
        &self,
        coverage: &mut CoverageStore,
        contract: &str,
        response: &ObservedResponse<'_>,
    ) -> Result<ValidationVerdict, StoreError> {
        let verdict = self.validate(contract, response)?;
        if let Some(template) = verdict.matched_path() {
            coverage.record(contract, response.method, template);
        }
        Ok(verdict)
    }
}
