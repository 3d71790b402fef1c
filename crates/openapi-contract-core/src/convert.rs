//! Conversion: OpenAPI schema dialect → JSON Schema Draft-07
//!
//! OpenAPI 3.0 schemas carry keywords Draft-07 does not know (`nullable`,
//! `readOnly`, ...), and 3.1 schemas use 2020-12 keywords (`prefixItems`,
//! `$dynamicRef`, ...). The validator only speaks Draft-07, so every response
//! schema goes through [`convert_schema`] first.

use serde_json::{Map, Value, json};

use crate::version::OpenApiVersion;

/// Annotation keywords removed for every dialect.
const COMMON_KEYS: &[&str] = &["discriminator", "xml", "externalDocs", "example", "deprecated"];

/// OpenAPI 3.0 keywords with no Draft-07 counterpart.
const V3_0_KEYS: &[&str] = &["nullable", "readOnly", "writeOnly"];

/// Draft 2020-12 keywords with no Draft-07 counterpart.
const V3_1_KEYS: &[&str] = &["$dynamicRef", "$dynamicAnchor", "contentSchema", "examples"];

/// Convert an OpenAPI schema into a Draft-07 compatible schema.
///
/// Non-object input is returned unchanged. The input is never modified.
#[must_use]
pub fn convert_schema(schema: &Value, version: OpenApiVersion) -> Value {
    match schema {
        Value::Object(node) => Value::Object(convert_node(node.clone(), version)),
        other => other.clone(),
    }
}

fn convert_node(mut node: Map<String, Value>, version: OpenApiVersion) -> Map<String, Value> {
    match version {
        OpenApiVersion::V3_0 => {
            apply_nullable(&mut node);
            remove_keys(&mut node, V3_0_KEYS);
        }
        OpenApiVersion::V3_1 => {
            apply_prefix_items(&mut node);
            remove_keys(&mut node, V3_1_KEYS);
        }
    }
    remove_keys(&mut node, COMMON_KEYS);

    if let Some(Value::Object(properties)) = node.get_mut("properties") {
        for property in properties.values_mut() {
            convert_in_place(property, version);
        }
    }

    match node.get_mut("items") {
        Some(Value::Array(tuple)) => {
            for item in tuple.iter_mut() {
                convert_in_place(item, version);
            }
        }
        Some(item) => convert_in_place(item, version),
        None => {}
    }

    for combiner in ["allOf", "oneOf", "anyOf"] {
        if let Some(Value::Array(members)) = node.get_mut(combiner) {
            for member in members.iter_mut() {
                convert_in_place(member, version);
            }
        }
    }

    // `additionalProperties: false` stays a boolean
    for key in ["additionalProperties", "not"] {
        if let Some(sub) = node.get_mut(key) {
            convert_in_place(sub, version);
        }
    }

    node
}

/// Convert a nested schema value; non-objects pass through.
fn convert_in_place(value: &mut Value, version: OpenApiVersion) {
    if let Value::Object(node) = value {
        let converted = convert_node(std::mem::take(node), version);
        *node = converted;
    }
}

/// OpenAPI 3.0 `nullable: true` → explicit `null` alternative.
fn apply_nullable(node: &mut Map<String, Value>) {
    if node.get("nullable") != Some(&Value::Bool(true)) {
        return;
    }
    node.remove("nullable");

    if let Some(Value::String(ty)) = node.get("type") {
        let ty = ty.clone();
        node.insert("type".into(), json!([ty, "null"]));
        return;
    }

    for combiner in ["oneOf", "anyOf"] {
        if let Some(Value::Array(alternatives)) = node.get_mut(combiner) {
            alternatives.push(json!({"type": "null"}));
            return;
        }
    }

    if matches!(node.get("allOf"), Some(Value::Array(_))) {
        if let Some(all_of) = node.remove("allOf") {
            node.insert(
                "oneOf".into(),
                json!([{"allOf": all_of}, {"type": "null"}]),
            );
        }
    }
}

/// Draft 2020-12 `prefixItems` → Draft-07 tuple `items`.
fn apply_prefix_items(node: &mut Map<String, Value>) {
    if matches!(node.get("prefixItems"), Some(Value::Array(_))) {
        if let Some(prefix_items) = node.remove("prefixItems") {
            node.insert("items".into(), prefix_items);
        }
    }
}

fn remove_keys(node: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        node.remove(*key);
    }
}
