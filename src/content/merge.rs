use serde_json::{Map, Value};

use crate::schema::node::SchemaNode;

/// Combine a shared document and one locale's translation document back into
/// a single logical view.
///
/// Structural mirror of `split`: at each primitive leaf the translation value
/// wins when the field is localizable and present, else the shared value,
/// else null. Container keys/elements appear only when their merged
/// sub-result is non-null and non-empty, which makes this the exact
/// left-inverse of `split` for a fixed schema. Which translation document to
/// pass (requested locale vs. tenant default fallback) is the caller's call.
pub fn merge(shared: Option<&Value>, translation: Option<&Value>, schema: &SchemaNode) -> Value {
    merge_node(shared, translation, schema).unwrap_or(Value::Null)
}

fn merge_node(
    shared: Option<&Value>,
    translation: Option<&Value>,
    schema: &SchemaNode,
) -> Option<Value> {
    let shared = non_null(shared);
    let translation = non_null(translation);

    match schema {
        SchemaNode::Primitive(prim) => {
            if prim.localizable {
                translation.or(shared).cloned()
            } else {
                shared.cloned()
            }
        }
        SchemaNode::Object(obj) => {
            // Mismatched shared data was passed through whole at split time;
            // hand it back the same way
            if let Some(value) = shared {
                if !value.is_object() {
                    return Some(value.clone());
                }
            }

            let empty = Map::new();
            let shared_map = shared.and_then(|v| v.as_object()).unwrap_or(&empty);
            let translation_map = translation.and_then(|v| v.as_object()).unwrap_or(&empty);

            let mut out = Map::new();
            for (key, child_schema) in &obj.properties {
                if let Some(merged) =
                    merge_node(shared_map.get(key), translation_map.get(key), child_schema)
                {
                    out.insert(key.clone(), merged);
                }
            }

            // Shared keys outside the schema were pass-through at split time
            for (key, value) in shared_map {
                if !obj.has_property(key) {
                    out.insert(key.clone(), value.clone());
                }
            }

            if out.is_empty() {
                None
            } else {
                Some(Value::Object(out))
            }
        }
        SchemaNode::Array(arr) => {
            if let Some(value) = shared {
                if !value.is_array() {
                    return Some(value.clone());
                }
            }

            let empty = Vec::new();
            let shared_items = shared.and_then(|v| v.as_array()).unwrap_or(&empty);
            let translation_items = translation.and_then(|v| v.as_array()).unwrap_or(&empty);

            let len = shared_items.len().max(translation_items.len());
            let mut out = Vec::new();
            for i in 0..len {
                if let Some(merged) =
                    merge_node(shared_items.get(i), translation_items.get(i), &arr.items)
                {
                    out.push(merged);
                }
            }

            if out.is_empty() {
                None
            } else {
                Some(Value::Array(out))
            }
        }
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}
