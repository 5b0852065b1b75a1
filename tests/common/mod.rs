// Shared in-memory collaborators and fixtures for integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use loom_content::schema::attribute::{
    AttributeDefinition, ComponentAttribute, ComponentBlueprint, FieldPath, PrimitiveAttribute,
};
use loom_content::schema::node::{CompiledSchema, PrimitiveKind};
use loom_content::services::stores::{
    AttributeStore, DocumentStore, StoreError, StoredDocument,
};

/// Attribute store backed by plain maps; read-only, like the real one is to
/// the core
pub struct MemoryAttributeStore {
    collections: HashMap<String, Vec<AttributeDefinition>>,
    blueprints: HashMap<String, ComponentBlueprint>,
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self {
            collections: HashMap::new(),
            blueprints: HashMap::new(),
        }
    }

    pub fn with_collection(mut self, name: &str, attributes: Vec<AttributeDefinition>) -> Self {
        self.collections.insert(name.to_string(), attributes);
        self
    }

    pub fn with_blueprint(mut self, blueprint: ComponentBlueprint) -> Self {
        self.blueprints.insert(blueprint.key.clone(), blueprint);
        self
    }
}

#[async_trait]
impl AttributeStore for MemoryAttributeStore {
    async fn attributes(&self, collection: &str) -> Result<Vec<AttributeDefinition>, StoreError> {
        self.collections
            .get(collection)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(collection.to_string()))
    }

    async fn blueprint(&self, key: &str) -> Result<Option<ComponentBlueprint>, StoreError> {
        Ok(self.blueprints.get(key).cloned())
    }
}

/// Document store recording everything persisted, for assertions
#[derive(Default)]
pub struct MemoryDocumentStore {
    pub pairs: Mutex<HashMap<String, Vec<StoredDocument>>>,
    pub schemas: Mutex<HashMap<String, (CompiledSchema, Vec<FieldPath>)>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_pair(&self, collection: &str, document: StoredDocument) {
        self.pairs
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    pub fn stored_pairs(&self, collection: &str) -> Vec<StoredDocument> {
        self.pairs
            .lock()
            .unwrap()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn stored_schema(&self, collection: &str) -> Option<(CompiledSchema, Vec<FieldPath>)> {
        self.schemas.lock().unwrap().get(collection).cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn document_pairs(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self.stored_pairs(collection))
    }

    async fn persist_schema(
        &self,
        collection: &str,
        schema: &CompiledSchema,
        paths: &[FieldPath],
    ) -> Result<(), StoreError> {
        self.schemas
            .lock()
            .unwrap()
            .insert(collection.to_string(), (schema.clone(), paths.to_vec()));
        Ok(())
    }

    async fn persist_pair(
        &self,
        collection: &str,
        document: &StoredDocument,
    ) -> Result<(), StoreError> {
        let mut pairs = self.pairs.lock().unwrap();
        let rows = pairs.entry(collection.to_string()).or_default();
        // Last writer wins per (id, locale)
        rows.retain(|row| !(row.id == document.id && row.locale == document.locale));
        rows.push(document.clone());
        Ok(())
    }
}

// Fixtures

/// `title` (shared) + `body` (localizable), the canonical article shape
pub fn article_attributes() -> Vec<AttributeDefinition> {
    vec![
        AttributeDefinition::Primitive(
            PrimitiveAttribute::new("title", PrimitiveKind::String, 0).required(true),
        ),
        AttributeDefinition::Primitive(
            PrimitiveAttribute::new("body", PrimitiveKind::String, 1).localizable(true),
        ),
    ]
}

pub fn author_blueprint(repeatable: bool) -> ComponentBlueprint {
    ComponentBlueprint {
        key: "author".to_string(),
        label: "Author".to_string(),
        repeatable,
        attributes: vec![
            AttributeDefinition::Primitive(PrimitiveAttribute::new(
                "name",
                PrimitiveKind::String,
                0,
            )),
            AttributeDefinition::Primitive(
                PrimitiveAttribute::new("bio", PrimitiveKind::String, 1).localizable(true),
            ),
        ],
    }
}

pub fn component_attribute(key: &str, component: &str, position: i32) -> AttributeDefinition {
    AttributeDefinition::Component(ComponentAttribute::new(key, component, position))
}

pub fn seeded_article(store: &MemoryDocumentStore, collection: &str, locale: &str) -> Uuid {
    let id = Uuid::new_v4();
    store.seed_pair(
        collection,
        StoredDocument {
            id,
            locale: locale.to_string(),
            shared: Some(json!({"title": "T"})),
            translation: Some(json!({"body": "B"})),
        },
    );
    id
}
