pub mod attribute;
pub mod compiler;
pub mod node;
pub mod validate;

pub use attribute::{
    AttributeDefinition, ComponentAttribute, ComponentBlueprint, ComponentResolver,
    DynamicZoneAttribute, FieldKind, FieldPath, PrimitiveAttribute,
};
pub use compiler::{compile, compile_versioned, SchemaCompileError};
pub use node::{derive_localizable, CompiledSchema, PrimitiveKind, SchemaNode};
pub use validate::{ensure_expanded, to_json_schema, ValidationError, Validator};
