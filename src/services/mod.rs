pub mod schema_service;
pub mod stores;

pub use schema_service::{RebuildReport, SchemaService};
pub use stores::{AttributeStore, DocumentStore, StoreError, StoredDocument};
