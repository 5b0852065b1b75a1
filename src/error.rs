// Crate-level error type aggregating the module error taxonomies
use crate::schema::compiler::SchemaCompileError;
use crate::schema::validate::ValidationError;
use crate::services::stores::StoreError;

/// Errors a caller of the core can observe.
///
/// Compile errors are fatal to the triggering attribute mutation and always
/// precede any rebuild work. Validation errors come from the validator
/// collaborator and are surfaced unchanged. Cast failures are policy, not
/// errors: they degrade to defaults and never appear here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Schema compilation failed: {0}")]
    SchemaCompile(#[from] SchemaCompileError),
    #[error("Document validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
