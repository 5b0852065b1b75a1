use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use uuid::Uuid;

use crate::config;
use crate::schema::attribute::{AttributeDefinition, ComponentResolver};
use crate::schema::node::{
    ArrayNode, CompiledSchema, ObjectNode, PrimitiveKind, PrimitiveNode, SchemaNode,
};

/// Fatal errors raised while compiling attribute definitions into a schema
/// tree. Any of these aborts the triggering attribute mutation; no rebuild
/// pass may start after a compile failure.
#[derive(Debug, thiserror::Error)]
pub enum SchemaCompileError {
    #[error("Unresolved component '{component}' referenced by attribute '{key}'")]
    UnresolvedComponent { key: String, component: String },
    #[error("Cyclic component reference: {chain}")]
    CyclicComponent { chain: String },
    #[error("Attribute '{key}' is not a legal kind inside '{scope}'")]
    IllegalAttribute { key: String, scope: String },
    #[error("Duplicate attribute key '{key}' in '{scope}'")]
    DuplicateKey { key: String, scope: String },
    #[error("Component nesting exceeds maximum depth {max}")]
    DepthExceeded { max: u32 },
    #[error("Schema serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Compile a flat, ordered attribute list into a structural schema tree.
///
/// Attributes are iterated in `position` order; component references are
/// expanded recursively through the resolver. Deterministic: the same list
/// always yields a structurally identical tree.
pub fn compile(
    attributes: &[AttributeDefinition],
    resolver: &dyn ComponentResolver,
) -> Result<SchemaNode, SchemaCompileError> {
    let mut stack = Vec::new();
    compile_scope(attributes, resolver, "collection", true, &mut stack)
}

/// Compile and wrap as a persistable schema version with checksum metadata
pub fn compile_versioned(
    attributes: &[AttributeDefinition],
    resolver: &dyn ComponentResolver,
) -> Result<CompiledSchema, SchemaCompileError> {
    let root = compile(attributes, resolver)?;
    let canonical = serde_json::to_vec(&root)?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let checksum = format!("{:x}", hasher.finalize());

    Ok(CompiledSchema {
        version: Uuid::new_v4(),
        checksum,
        compiled_at: Utc::now(),
        field_count: root.field_count(),
        root,
    })
}

fn compile_scope(
    attributes: &[AttributeDefinition],
    resolver: &dyn ComponentResolver,
    scope: &str,
    allow_dynamic_zone: bool,
    stack: &mut Vec<String>,
) -> Result<SchemaNode, SchemaCompileError> {
    let max_depth = config::config().schema.max_component_depth;
    if stack.len() as u32 > max_depth {
        return Err(SchemaCompileError::DepthExceeded { max: max_depth });
    }

    let mut ordered: Vec<&AttributeDefinition> = attributes.iter().collect();
    ordered.sort_by_key(|attr| attr.position());

    let mut seen: HashSet<&str> = HashSet::new();
    let mut properties: Vec<(String, SchemaNode)> = Vec::new();
    let mut required: Vec<String> = Vec::new();

    for attr in ordered {
        if !seen.insert(attr.key()) {
            return Err(SchemaCompileError::DuplicateKey {
                key: attr.key().to_string(),
                scope: scope.to_string(),
            });
        }

        let node = match attr {
            AttributeDefinition::Primitive(prim) => {
                let leaf = SchemaNode::Primitive(PrimitiveNode {
                    kind: prim.primitive_kind,
                    format: prim.format.clone(),
                    enum_values: prim.enum_values.clone(),
                    bounds: prim.bounds.clone(),
                    default: prim.default_value.clone(),
                    localizable: prim.localizable,
                });
                if prim.repeatable {
                    SchemaNode::array(leaf)
                } else {
                    leaf
                }
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

                if config::config().schema.debug_logging {
                    tracing::debug!(
                        "Expanding component '{}' at attribute '{}' (depth {})",
                        comp.component_ref,
                        comp.key,
                        stack.len()
                    );
                }

                stack.push(comp.component_ref.clone());
                let inner = compile_scope(
                    &blueprint.attributes,
                    resolver,
                    &blueprint.key,
                    false,
                    stack,
                )?;
                stack.pop();

                if comp.repeatable || blueprint.repeatable {
                    SchemaNode::array(inner)
                } else {
                    inner
                }
            }
            AttributeDefinition::DynamicZone(zone) => {
                // Only collection-scope attributes may declare a zone; a
                // component's own schema never contains one
                if !allow_dynamic_zone {
                    return Err(SchemaCompileError::IllegalAttribute {
                        key: zone.key.clone(),
                        scope: scope.to_string(),
                    });
                }
                dynamic_zone_node()
            }
        };

        if attr.required() {
            required.push(attr.key().to_string());
        }
        properties.push((attr.key().to_string(), node));
    }

    Ok(SchemaNode::Object(ObjectNode {
        properties,
        required,
        additional_properties: false,
    }))
}

/// Permissive array-of-objects shape for dynamic zone entries, discriminated
/// by a `__component` key
fn dynamic_zone_node() -> SchemaNode {
    let entry = SchemaNode::Object(ObjectNode {
        properties: vec![(
            "__component".to_string(),
            SchemaNode::primitive(PrimitiveKind::String),
        )],
        required: vec!["__component".to_string()],
        additional_properties: true,
    });
    SchemaNode::Array(ArrayNode {
        items: Box::new(entry),
    })
}
