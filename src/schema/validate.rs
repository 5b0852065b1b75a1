use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::schema::node::SchemaNode;

/// Marker key legacy stored schemas carry on a component use that was never
/// expanded. A schema containing one must never reach a validator.
pub const PLACEHOLDER_KEY: &str = "x-component-ref";

/// Structural validation failure, surfaced unchanged by the core
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: Option<HashMap<String, String>>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn with_field_errors(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        Self {
            message: message.into(),
            field_errors: Some(field_errors),
        }
    }
}

/// Off-the-shelf JSON Schema engine; implemented outside the core
pub trait Validator {
    fn validate(&self, schema: &Value, document: &Value) -> Result<(), ValidationError>;
}

/// Project a compiled schema tree to its JSON Schema form.
///
/// The `localizable` flag rides along as an `x-localizable` vendor key so the
/// projection stays lossless for tooling that wants it.
pub fn to_json_schema(node: &SchemaNode) -> Value {
    match node {
        SchemaNode::Primitive(prim) => {
            let mut out = Map::new();
            out.insert("type".to_string(), json!(prim.kind.json_type()));
            if let Some(format) = &prim.format {
                out.insert("format".to_string(), json!(format));
            }
            if let Some(enum_values) = &prim.enum_values {
                out.insert("enum".to_string(), json!(enum_values));
            }
            if let Some(bounds) = &prim.bounds {
                if let Some(v) = bounds.min_length {
                    out.insert("minLength".to_string(), json!(v));
                }
                if let Some(v) = bounds.max_length {
                    out.insert("maxLength".to_string(), json!(v));
                }
                if let Some(v) = bounds.minimum {
                    out.insert("minimum".to_string(), json!(v));
                }
                if let Some(v) = bounds.maximum {
                    out.insert("maximum".to_string(), json!(v));
                }
            }
            if let Some(default) = &prim.default {
                out.insert("default".to_string(), default.clone());
            }
            if prim.localizable {
                out.insert("x-localizable".to_string(), json!(true));
            }
            Value::Object(out)
        }
        SchemaNode::Object(obj) => {
            let mut properties = Map::new();
            for (key, child) in &obj.properties {
                properties.insert(key.clone(), to_json_schema(child));
            }
            json!({
                "type": "object",
                "properties": properties,
                "required": obj.required,
                "additionalProperties": obj.additional_properties,
            })
        }
        SchemaNode::Array(arr) => {
            json!({
                "type": "array",
                "items": to_json_schema(&arr.items),
            })
        }
    }
}

/// Fail fast when a schema value still contains an unexpanded component
/// placeholder at any depth
pub fn ensure_expanded(schema: &Value) -> Result<(), ValidationError> {
    if let Some(path) = find_placeholder(schema, "$") {
        return Err(ValidationError::new(format!(
            "Schema contains an unexpanded component placeholder at {}; \
             recompile the owning collection before validating against it",
            path
        )));
    }
    Ok(())
}

fn find_placeholder(value: &Value, path: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            if map.contains_key(PLACEHOLDER_KEY) {
                return Some(path.to_string());
            }
            for (key, child) in map {
                if let Some(found) = find_placeholder(child, &format!("{}.{}", path, key)) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                if let Some(found) = find_placeholder(child, &format!("{}[{}]", path, idx)) {
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}

/// Project, pre-check, and hand off to the validator collaborator
pub fn validate_document(
    validator: &dyn Validator,
    schema: &SchemaNode,
    document: &Value,
) -> Result<(), ValidationError> {
    let projected = to_json_schema(schema);
    ensure_expanded(&projected)?;
    validator.validate(&projected, document)
}
