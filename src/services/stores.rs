use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::schema::attribute::{AttributeDefinition, ComponentBlueprint, FieldPath};
use crate::schema::node::CompiledSchema;

/// Persistence-layer failures surfaced through the collaborator traits
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// One content item's shared/translation pair for one locale
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: Uuid,
    pub locale: String,
    pub shared: Option<Value>,
    pub translation: Option<Value>,
}

/// Read-side collaborator supplying attribute definitions and blueprint
/// lookups during compilation. The core only ever reads from it.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Ordered attribute list for a collection
    async fn attributes(&self, collection: &str) -> Result<Vec<AttributeDefinition>, StoreError>;

    /// Blueprint lookup by reference key
    async fn blueprint(&self, key: &str) -> Result<Option<ComponentBlueprint>, StoreError>;
}

/// Write-side collaborator owning schema and document persistence. The core
/// never talks to a database directly; atomic per-document application
/// (read-old, rebuild, write-new) is this layer's responsibility.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every stored pair referencing the collection, across locales
    async fn document_pairs(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;

    /// Persist a freshly compiled schema version and its recomputed field
    /// paths; must land before any rebuild output does
    async fn persist_schema(
        &self,
        collection: &str,
        schema: &CompiledSchema,
        paths: &[FieldPath],
    ) -> Result<(), StoreError>;

    /// Persist one rebuilt pair; last writer wins if two passes race
    async fn persist_pair(
        &self,
        collection: &str,
        document: &StoredDocument,
    ) -> Result<(), StoreError>;
}
