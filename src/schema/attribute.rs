use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::compiler::SchemaCompileError;
use crate::schema::node::{Bounds, PrimitiveKind};

/// A declared field on a content collection or component blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeDefinition {
    Primitive(PrimitiveAttribute),
    Component(ComponentAttribute),
    DynamicZone(DynamicZoneAttribute),
}

impl AttributeDefinition {
    pub fn key(&self) -> &str {
        match self {
            AttributeDefinition::Primitive(attr) => &attr.key,
            AttributeDefinition::Component(attr) => &attr.key,
            AttributeDefinition::DynamicZone(attr) => &attr.key,
        }
    }

    /// Ordinal governing property order in the compiled schema
    pub fn position(&self) -> i32 {
        match self {
            AttributeDefinition::Primitive(attr) => attr.position,
            AttributeDefinition::Component(attr) => attr.position,
            AttributeDefinition::DynamicZone(attr) => attr.position,
        }
    }

    pub fn required(&self) -> bool {
        match self {
            AttributeDefinition::Primitive(attr) => attr.required,
            AttributeDefinition::Component(attr) => attr.required,
            AttributeDefinition::DynamicZone(attr) => attr.required,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimitiveAttribute {
    pub key: String,
    pub label: String,
    pub primitive_kind: PrimitiveKind,
    pub required: bool,
    pub localizable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    pub repeatable: bool,
    pub position: i32,
}

impl PrimitiveAttribute {
    pub fn new(key: impl Into<String>, kind: PrimitiveKind, position: i32) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            primitive_kind: kind,
            required: false,
            localizable: false,
            format: None,
            enum_values: None,
            default_value: None,
            bounds: None,
            repeatable: false,
            position,
        }
    }

    pub fn localizable(mut self, localizable: bool) -> Self {
        self.localizable = localizable;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default_value = Some(default);
        self
    }
}

/// Use-site of a reusable component blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentAttribute {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub component_ref: String,
    pub repeatable: bool,
    pub position: i32,
}

impl ComponentAttribute {
    pub fn new(key: impl Into<String>, component_ref: impl Into<String>, position: i32) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            required: false,
            component_ref: component_ref.into(),
            repeatable: false,
            position,
        }
    }

    pub fn repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }
}

/// Placeholder attribute; legal only at collection scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicZoneAttribute {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub position: i32,
}

/// Named, reusable attribute set; `repeatable` expands uses to array-of-objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentBlueprint {
    pub key: String,
    pub label: String,
    pub repeatable: bool,
    pub attributes: Vec<AttributeDefinition>,
}

/// Blueprint lookup used during compilation and path recomputation
pub trait ComponentResolver {
    fn resolve(&self, key: &str) -> Option<&ComponentBlueprint>;
}

impl ComponentResolver for HashMap<String, ComponentBlueprint> {
    fn resolve(&self, key: &str) -> Option<&ComponentBlueprint> {
        self.get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Primitive(PrimitiveKind),
    Component,
    DynamicZone,
}

/// Dotted/indexed address of one attribute in the compiled schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    pub path: String,
    pub key: String,
    pub kind: FieldKind,
    /// False for non-primitive attributes
    pub localizable: bool,
}

/// Compute the dotted/indexed path for every attribute, cascading through
/// nested components.
///
/// Root attribute path is its key; nested paths join with `.`, or `[].` when
/// the parent component use is repeatable. Must be re-run for every attribute
/// that transitively nests a changed component.
pub fn field_paths(
    attributes: &[AttributeDefinition],
    resolver: &dyn ComponentResolver,
) -> Result<Vec<FieldPath>, SchemaCompileError> {
    let mut paths = Vec::new();
    let mut stack = Vec::new();
    collect_paths(attributes, resolver, "", &mut stack, &mut paths)?;
    Ok(paths)
}

fn collect_paths(
    attributes: &[AttributeDefinition],
    resolver: &dyn ComponentResolver,
    prefix: &str,
    stack: &mut Vec<String>,
    out: &mut Vec<FieldPath>,
) -> Result<(), SchemaCompileError> {
    let mut ordered: Vec<&AttributeDefinition> = attributes.iter().collect();
    ordered.sort_by_key(|attr| attr.position());

    for attr in ordered {
        let path = if prefix.is_empty() {
            attr.key().to_string()
        } else {
            format!("{}.{}", prefix, attr.key())
        };

        match attr {
            AttributeDefinition::Primitive(prim) => {
                out.push(FieldPath {
                    path,
                    key: prim.key.clone(),
                    kind: FieldKind::Primitive(prim.primitive_kind),
                    localizable: prim.localizable,
                });
            }
            AttributeDefinition::Component(comp) => {
                let blueprint = resolver.resolve(&comp.component_ref).ok_or_else(|| {
                    SchemaCompileError::UnresolvedComponent {
                        key: comp.key.clone(),
                        component: comp.component_ref.clone(),
                    }
                })?;
                if stack.iter().any(|k| k == &comp.component_ref) {
                    let mut chain = stack.clone();
                    chain.push(comp.component_ref.clone());
                    return Err(SchemaCompileError::CyclicComponent {
                        chain: chain.join(" -> "),
                    });
                }

                out.push(FieldPath {
                    path: path.clone(),
                    key: comp.key.clone(),
                    kind: FieldKind::Component,
                    localizable: false,
                });

                // Repeatable uses address children through an array segment
                let child_prefix = if comp.repeatable || blueprint.repeatable {
                    format!("{}[]", path)
                } else {
                    path
                };

                stack.push(comp.component_ref.clone());
                collect_paths(&blueprint.attributes, resolver, &child_prefix, stack, out)?;
                stack.pop();
            }
            AttributeDefinition::DynamicZone(zone) => {
                out.push(FieldPath {
                    path,
                    key: zone.key.clone(),
                    kind: FieldKind::DynamicZone,
                    localizable: false,
                });
            }
        }
    }

    Ok(())
}
