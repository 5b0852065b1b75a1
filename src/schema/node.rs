use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Primitive value kinds a schema leaf can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
}

impl PrimitiveKind {
    /// Fallback value when no default is declared
    pub fn zero_value(&self) -> Value {
        match self {
            PrimitiveKind::String => Value::String(String::new()),
            PrimitiveKind::Number => Value::from(0),
            PrimitiveKind::Boolean => Value::Bool(false),
        }
    }

    /// JSON Schema `type` keyword for this kind
    pub fn json_type(&self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

/// Length and numeric range constraints carried on primitive leaves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(rename = "minLength", skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i32>,
    #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

/// Leaf node: a single typed value with localization and constraint metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveNode {
    pub kind: PrimitiveKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    pub localizable: bool,
}

impl PrimitiveNode {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            format: None,
            enum_values: None,
            bounds: None,
            default: None,
            localizable: false,
        }
    }

    pub fn localizable(mut self, localizable: bool) -> Self {
        self.localizable = localizable;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

/// Interior node with position-ordered properties
///
/// Property order is semantic: it must match attribute `position` order, so
/// the map is kept as an ordered pair list rather than a hash map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub properties: Vec<(String, SchemaNode)>,
    pub required: Vec<String>,
    pub additional_properties: bool,
}

impl ObjectNode {
    pub fn property(&self, key: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, node)| node)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.iter().any(|(k, _)| k == key)
    }

    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|k| k == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayNode {
    pub items: Box<SchemaNode>,
}

/// Compiled structural schema: the tree every split/merge/rebuild walks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum SchemaNode {
    Primitive(PrimitiveNode),
    Object(ObjectNode),
    Array(ArrayNode),
}

impl SchemaNode {
    pub fn primitive(kind: PrimitiveKind) -> Self {
        SchemaNode::Primitive(PrimitiveNode::new(kind))
    }

    pub fn object(properties: Vec<(String, SchemaNode)>, required: Vec<String>) -> Self {
        SchemaNode::Object(ObjectNode {
            properties,
            required,
            additional_properties: false,
        })
    }

    pub fn array(items: SchemaNode) -> Self {
        SchemaNode::Array(ArrayNode {
            items: Box::new(items),
        })
    }

    /// Count of primitive leaves reachable from this node
    pub fn field_count(&self) -> usize {
        match self {
            SchemaNode::Primitive(_) => 1,
            SchemaNode::Object(obj) => obj
                .properties
                .iter()
                .map(|(_, node)| node.field_count())
                .sum(),
            SchemaNode::Array(arr) => arr.items.field_count(),
        }
    }
}

/// Whether any reachable primitive leaf is localizable
///
/// Containers never store the flag; it is derived by traversal every time
/// (merge and rebuild depend on this staying a pure recomputation).
pub fn derive_localizable(node: &SchemaNode) -> bool {
    match node {
        SchemaNode::Primitive(prim) => prim.localizable,
        SchemaNode::Object(obj) => obj
            .properties
            .iter()
            .any(|(_, child)| derive_localizable(child)),
        SchemaNode::Array(arr) => derive_localizable(&arr.items),
    }
}

/// A compiled schema version as handed to the Document Store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledSchema {
    pub version: Uuid,
    pub checksum: String,
    pub compiled_at: DateTime<Utc>,
    pub field_count: usize,
    pub root: SchemaNode,
}
