use serde_json::{Map, Value};

use crate::schema::node::SchemaNode;

/// The shared/translation halves of one logical document
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDocument {
    /// Non-localizable values, stored once for all locales
    pub shared: Option<Value>,
    /// Localizable values for one locale
    pub translation: Option<Value>,
}

/// Partition a document into its shared and translation halves, recursing in
/// lock-step with the schema.
///
/// Every primitive leaf value lands in exactly one half; document keys with
/// no schema property pass through to shared untouched. Empty containers are
/// reported as absent rather than serialized as `{}`/`[]`, which is what
/// makes `merge` an exact left-inverse.
pub fn split(document: &Value, schema: &SchemaNode) -> SplitDocument {
    let (shared, translation) = split_node(document, schema);
    SplitDocument {
        shared,
        translation,
    }
}

fn split_node(value: &Value, schema: &SchemaNode) -> (Option<Value>, Option<Value>) {
    // Explicit null is treated as absent; it is never routed to either half
    if value.is_null() {
        return (None, None);
    }

    match schema {
        SchemaNode::Primitive(prim) => {
            if prim.localizable {
                (None, Some(value.clone()))
            } else {
                (Some(value.clone()), None)
            }
        }
        SchemaNode::Object(obj) => {
            let Value::Object(doc) = value else {
                // Structurally mismatched data is non-localizable pass-through
                return (Some(value.clone()), None);
            };

            let mut shared = Map::new();
            let mut translation = Map::new();

            for (key, child_schema) in &obj.properties {
                if let Some(child_value) = doc.get(key) {
                    let (s, t) = split_node(child_value, child_schema);
                    if let Some(s) = s {
                        shared.insert(key.clone(), s);
                    }
                    if let Some(t) = t {
                        translation.insert(key.clone(), t);
                    }
                }
            }

            // Unknown document keys are never dropped; they ride in shared
            for (key, child_value) in doc {
                if !obj.has_property(key) {
                    shared.insert(key.clone(), child_value.clone());
                }
            }

            (non_empty_object(shared), non_empty_object(translation))
        }
        SchemaNode::Array(arr) => {
            let Value::Array(items) = value else {
                return (Some(value.clone()), None);
            };

            let mut shared = Vec::new();
            let mut translation = Vec::new();

            for item in items {
                let (s, t) = split_node(item, &arr.items);
                // Fully-absent sides are omitted, never padded with null
                if let Some(s) = s {
                    shared.push(s);
                }
                if let Some(t) = t {
                    translation.push(t);
                }
            }

            (non_empty_array(shared), non_empty_array(translation))
        }
    }
}

fn non_empty_object(map: Map<String, Value>) -> Option<Value> {
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

fn non_empty_array(items: Vec<Value>) -> Option<Value> {
    if items.is_empty() {
        None
    } else {
        Some(Value::Array(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::node::{PrimitiveKind, PrimitiveNode};
    use serde_json::json;

    fn string_prim(localizable: bool) -> SchemaNode {
        SchemaNode::Primitive(PrimitiveNode::new(PrimitiveKind::String).localizable(localizable))
    }

    fn article_schema() -> SchemaNode {
        SchemaNode::object(
            vec![
                ("title".to_string(), string_prim(false)),
                ("body".to_string(), string_prim(true)),
            ],
            vec![],
        )
    }

    #[test]
    fn primitives_route_by_localizable_flag() {
        let doc = json!({"title": "T", "body": "B"});
        let result = split(&doc, &article_schema());
        assert_eq!(result.shared, Some(json!({"title": "T"})));
        assert_eq!(result.translation, Some(json!({"body": "B"})));
    }

    #[test]
    fn absent_values_stay_absent() {
        let doc = json!({"title": "T"});
        let result = split(&doc, &article_schema());
        assert_eq!(result.shared, Some(json!({"title": "T"})));
        assert_eq!(result.translation, None);
    }

    #[test]
    fn unknown_keys_pass_through_to_shared() {
        let doc = json!({"title": "T", "legacy_field": 9});
        let result = split(&doc, &article_schema());
        assert_eq!(
            result.shared,
            Some(json!({"title": "T", "legacy_field": 9}))
        );
    }

    #[test]
    fn empty_containers_are_reported_absent() {
        let schema = SchemaNode::object(
            vec![(
                "meta".to_string(),
                SchemaNode::object(vec![("note".to_string(), string_prim(true))], vec![]),
            )],
            vec![],
        );
        let doc = json!({"meta": {"note": "hello"}});
        let result = split(&doc, &schema);
        // Everything under meta is localizable, so shared has nothing; it
        // must be absent, not {"meta": {}}
        assert_eq!(result.shared, None);
        assert_eq!(result.translation, Some(json!({"meta": {"note": "hello"}})));
    }

    #[test]
    fn arrays_split_per_element_without_padding() {
        let schema = SchemaNode::object(
            vec![(
                "quotes".to_string(),
                SchemaNode::array(SchemaNode::object(
                    vec![
                        ("who".to_string(), string_prim(false)),
                        ("text".to_string(), string_prim(true)),
                    ],
                    vec![],
                )),
            )],
            vec![],
        );
        let doc = json!({"quotes": [
            {"who": "A", "text": "one"},
            {"who": "B", "text": "two"},
        ]});
        let result = split(&doc, &schema);
        assert_eq!(
            result.shared,
            Some(json!({"quotes": [{"who": "A"}, {"who": "B"}]}))
        );
        assert_eq!(
            result.translation,
            Some(json!({"quotes": [{"text": "one"}, {"text": "two"}]}))
        );
    }

    #[test]
    fn explicit_null_is_absent() {
        let doc = json!({"title": null, "body": "B"});
        let result = split(&doc, &article_schema());
        assert_eq!(result.shared, None);
        assert_eq!(result.translation, Some(json!({"body": "B"})));
    }

    #[test]
    fn every_leaf_lands_in_exactly_one_half() {
        let doc = json!({"title": "T", "body": "B"});
        let result = split(&doc, &article_schema());
        let shared = result.shared.unwrap();
        let translation = result.translation.unwrap();
        for key in ["title", "body"] {
            let in_shared = shared.get(key).is_some();
            let in_translation = translation.get(key).is_some();
            assert!(in_shared ^ in_translation, "key {} must be in exactly one half", key);
        }
    }
}
