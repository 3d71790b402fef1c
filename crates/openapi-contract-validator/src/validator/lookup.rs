//! Walking the contract document: operations, responses and local `$ref`s

use serde_json::{Map, Value};

use openapi_contract_core::{OpenApiVersion, convert_schema};

/// Longest chain of `$ref`s followed from one node.
const MAX_REF_DEPTH: usize = 20;

/// Operation object for `method` (any case) under `template`.
pub(crate) fn operation<'d>(
    document: &'d Value,
    template: &str,
    method: &str,
) -> Option<&'d Map<String, Value>> {
    document
        .get("paths")?
        .get(template)?
        .get(method.to_ascii_lowercase())?
        .as_object()
}

/// Response object declared for the exact status code, following a local `$ref`.
pub(crate) fn response<'d>(
    document: &'d Value,
    operation: &'d Map<String, Value>,
    status_code: u16,
) -> Option<&'d Value> {
    let mut entry = operation.get("responses")?.get(status_code.to_string())?;
    for _ in 0..MAX_REF_DEPTH {
        match local_ref(document, entry) {
            Some(target) => entry = target,
            None => break,
        }
    }
    Some(entry)
}

/// Inline local (`#/...`) references in a schema tree.
///
/// A reference already being expanded further up the same branch is kept as
/// a `$ref`, so recursive components stay finite. Unresolvable or non-local
/// references stay as they are.
pub(crate) fn resolve_refs(schema: &Value, document: &Value) -> Value {
    resolve_refs_inner(schema, document, &mut Vec::new())
}

fn resolve_refs_inner(schema: &Value, document: &Value, trail: &mut Vec<String>) -> Value {
    match schema {
        Value::Object(obj) => {
            if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                if trail.len() >= MAX_REF_DEPTH || trail.iter().any(|seen| seen == reference) {
                    return schema.clone();
                }
                let Some(target) = local_ref(document, schema) else {
                    return schema.clone();
                };
                trail.push(reference.to_string());
                let resolved = resolve_refs_inner(target, document, trail);
                trail.pop();
                return resolved;
            }
            Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), resolve_refs_inner(v, document, trail)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(
            arr.iter()
                .map(|v| resolve_refs_inner(v, document, trail))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Give the engine the document's schema components when `$ref`s survived inlining.
///
/// Leftover local pointers (`#/components/schemas/...`) then resolve against
/// the converted schema's own root.
pub(crate) fn attach_components(schema: &mut Value, document: &Value, version: OpenApiVersion) {
    if !has_local_ref(schema) {
        return;
    }
    let Some(schemas) = document
        .pointer("/components/schemas")
        .and_then(Value::as_object)
    else {
        return;
    };
    let Value::Object(root) = schema else {
        return;
    };
    if root.contains_key("components") {
        tracing::warn!("schema already has a `components` key; leftover $refs stay unresolved");
        return;
    }

    let converted: Map<String, Value> = schemas
        .iter()
        .map(|(name, component)| (name.clone(), convert_schema(component, version)))
        .collect();
    let mut components = Map::new();
    components.insert("schemas".to_string(), Value::Object(converted));
    root.insert("components".to_string(), Value::Object(components));
}

fn has_local_ref(schema: &Value) -> bool {
    match schema {
        Value::Object(obj) => {
            obj.get("$ref")
                .and_then(Value::as_str)
                .is_some_and(|r| r.starts_with('#'))
                || obj.values().any(has_local_ref)
        }
        Value::Array(arr) => arr.iter().any(has_local_ref),
        _ => false,
    }
}

fn local_ref<'d>(document: &'d Value, node: &Value) -> Option<&'d Value> {
    let pointer = node.get("$ref")?.as_str()?.strip_prefix('#')?;
    document.pointer(pointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "paths": {
                "/pets": {
                    "get": {
                        "responses": {
                            "200": {"$ref": "#/components/responses/PetList"},
                            "404": {"description": "missing"}
                        }
                    },
                    "parameters": []
                }
            },
            "components": {
                "responses": {
                    "PetList": {
                        "description": "ok",
                        "content": {
                            "application/json": {
                                "schema": {"type": "array", "items": {"$ref": "#/components/schemas/Pet"}}
                            }
                        }
                    }
                },
                "schemas": {
                    "Pet": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "integer"},
                            "owner": {"$ref": "#/components/schemas/Owner"}
                        }
                    },
                    "Owner": {"type": "object", "properties": {"name": {"type": "string"}}},
                    "Node": {
                        "type": "object",
                        "properties": {"next": {"$ref": "#/components/schemas/Node"}}
                    }
                }
            }
        })
    }

    #[test]
    fn operation_is_case_insensitive() {
        let doc = document();
        assert!(operation(&doc, "/pets", "GET").is_some());
        assert!(operation(&doc, "/pets", "get").is_some());
        assert!(operation(&doc, "/pets", "POST").is_none());
        assert!(operation(&doc, "/other", "GET").is_none());
    }

    #[test]
    fn non_object_operation_is_ignored() {
        let doc = document();
        // `parameters` sits next to the methods but is not an operation
        assert!(operation(&doc, "/pets", "parameters").is_none());
    }

    #[test]
    fn response_follows_ref() {
        let doc = document();
        let op = operation(&doc, "/pets", "GET").unwrap();
        let resp = response(&doc, op, 200).unwrap();
        assert_eq!(resp["description"], "ok");
        assert_eq!(response(&doc, op, 404).unwrap()["description"], "missing");
        assert!(response(&doc, op, 500).is_none());
    }

    #[test]
    fn resolves_nested_refs() {
        let doc = document();
        let schema = json!({"$ref": "#/components/schemas/Pet"});
        let resolved = resolve_refs(&schema, &doc);
        assert_eq!(resolved["properties"]["owner"]["properties"]["name"]["type"], "string");
    }

    #[test]
    fn unresolvable_ref_kept() {
        let doc = document();
        let schema = json!({"$ref": "other.yaml#/Pet"});
        assert_eq!(resolve_refs(&schema, &doc), schema);
        let missing = json!({"$ref": "#/components/schemas/Missing"});
        assert_eq!(resolve_refs(&missing, &doc), missing);
    }

    #[test]
    fn recursive_ref_kept_one_level_down() {
        let doc = document();
        let resolved = resolve_refs(&json!({"$ref": "#/components/schemas/Node"}), &doc);
        assert_eq!(resolved["type"], "object");
        assert_eq!(
            resolved["properties"]["next"],
            json!({"$ref": "#/components/schemas/Node"})
        );
    }

    #[test]
    fn deep_nesting_does_not_stop_resolution() {
        let mut schema = json!({"$ref": "#/components/schemas/Owner"});
        for _ in 0..15 {
            schema = json!({"type": "object", "properties": {"x": schema}});
        }
        let resolved = resolve_refs(&schema, &document());
        assert!(!has_local_ref(&resolved));
    }

    #[test]
    fn sibling_uses_of_same_ref_both_resolve() {
        let doc = document();
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"$ref": "#/components/schemas/Owner"},
                "b": {"$ref": "#/components/schemas/Owner"}
            }
        });
        let resolved = resolve_refs(&schema, &doc);
        assert_eq!(resolved["properties"]["a"], resolved["properties"]["b"]);
        assert_eq!(resolved["properties"]["b"]["type"], "object");
    }

    #[test]
    fn components_attached_only_for_leftover_refs() {
        let doc = document();
        let mut plain = json!({"type": "string"});
        attach_components(&mut plain, &doc, OpenApiVersion::V3_0);
        assert!(plain.get("components").is_none());

        let mut recursive = resolve_refs(&json!({"$ref": "#/components/schemas/Node"}), &doc);
        attach_components(&mut recursive, &doc, OpenApiVersion::V3_0);
        assert_eq!(recursive["components"]["schemas"]["Node"]["type"], "object");
        assert!(recursive.pointer("/components/schemas/Node").is_some());
    }

    #[test]
    fn attached_components_are_converted() {
        let doc = json!({
            "components": {
                "schemas": {
                    "Tag": {
                        "type": "object",
                        "properties": {
                            "label": {"type": "string", "nullable": true},
                            "parent": {"$ref": "#/components/schemas/Tag"}
                        }
                    }
                }
            }
        });
        let mut schema = resolve_refs(&json!({"$ref": "#/components/schemas/Tag"}), &doc);
        attach_components(&mut schema, &doc, OpenApiVersion::V3_0);
        assert_eq!(
            schema["components"]["schemas"]["Tag"]["properties"]["label"]["type"],
            json!(["string", "null"])
        );
    }
}
