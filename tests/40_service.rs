mod common;

use anyhow::Result;
use serde_json::json;
use uuid::Uuid;

use loom_content::schema::attribute::PrimitiveAttribute;
use loom_content::schema::node::PrimitiveKind;
use loom_content::schema::AttributeDefinition;
use loom_content::services::stores::StoredDocument;
use loom_content::services::SchemaService;
use loom_content::Error;

// End-to-end orchestration over the in-memory collaborators: recompile a
// collection's schema and fan the rebuild out across its stored pairs.

fn subtitle_attribute(position: i32) -> AttributeDefinition {
    AttributeDefinition::Primitive(
        PrimitiveAttribute::new("subtitle", PrimitiveKind::String, position)
            .localizable(true)
            .with_default(json!("")),
    )
}

#[tokio::test]
async fn recompile_persists_schema_and_paths() -> Result<()> {
    let mut attrs = common::article_attributes();
    attrs.push(common::component_attribute("author", "author", 2));

    let attribute_store = common::MemoryAttributeStore::new()
        .with_collection("articles", attrs)
        .with_blueprint(common::author_blueprint(false));
    let document_store = common::MemoryDocumentStore::new();

    let service = SchemaService::new(attribute_store, document_store);
    let compiled = service.recompile("articles").await?;
    assert_eq!(compiled.field_count, 4);
    Ok(())
}

#[tokio::test]
async fn rebuild_pass_updates_every_stored_pair() -> Result<()> {
    let mut attrs = common::article_attributes();
    attrs.push(subtitle_attribute(2));

    let attribute_store =
        common::MemoryAttributeStore::new().with_collection("articles", attrs);
    let document_store = common::MemoryDocumentStore::new();

    // Documents stored before subtitle existed, across two locales
    let id = Uuid::new_v4();
    for locale in ["en", "de"] {
        document_store.seed_pair(
            "articles",
            StoredDocument {
                id,
                locale: locale.to_string(),
                shared: Some(json!({"title": "T"})),
                translation: Some(json!({"body": format!("B-{locale}")})),
            },
        );
    }
    for _ in 0..10 {
        common::seeded_article(&document_store, "articles", "en");
    }

    let service = SchemaService::new(attribute_store, document_store);
    let report = service.recompile_and_rebuild("articles").await?;

    assert_eq!(report.documents, 12);
    assert_eq!(report.failed, 0);

    // Every persisted translation picked up the defaulted subtitle
    let store = service_store(&service);
    for pair in store.stored_pairs("articles") {
        let translation = pair.translation.expect("translation present");
        assert_eq!(translation["subtitle"], json!(""));
        assert!(translation["body"].is_string());
        assert_eq!(pair.shared, Some(json!({"title": "T"})));
    }
    Ok(())
}

#[tokio::test]
async fn compile_failure_leaves_documents_untouched() -> Result<()> {
    let mut attrs = common::article_attributes();
    attrs.push(common::component_attribute("hero", "missing.hero", 2));

    let attribute_store =
        common::MemoryAttributeStore::new().with_collection("articles", attrs);
    let document_store = common::MemoryDocumentStore::new();
    common::seeded_article(&document_store, "articles", "en");

    let service = SchemaService::new(attribute_store, document_store);
    let err = service.recompile_and_rebuild("articles").await.unwrap_err();
    assert!(matches!(err, Error::SchemaCompile(_)));

    // No schema persisted, no rebuild ran
    let store = service_store(&service);
    assert!(store.stored_schema("articles").is_none());
    let pairs = store.stored_pairs("articles");
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].shared, Some(json!({"title": "T"})));
    Ok(())
}

#[tokio::test]
async fn rebuild_report_counts_degraded_documents() -> Result<()> {
    let attrs = vec![
        AttributeDefinition::Primitive(PrimitiveAttribute::new(
            "title",
            PrimitiveKind::String,
            0,
        )),
        AttributeDefinition::Primitive(PrimitiveAttribute::new(
            "rating",
            PrimitiveKind::Number,
            1,
        )),
    ];
    let attribute_store =
        common::MemoryAttributeStore::new().with_collection("articles", attrs);
    let document_store = common::MemoryDocumentStore::new();

    document_store.seed_pair(
        "articles",
        StoredDocument {
            id: Uuid::new_v4(),
            locale: "en".to_string(),
            shared: Some(json!({"title": "ok", "rating": "not-a-number"})),
            translation: None,
        },
    );
    document_store.seed_pair(
        "articles",
        StoredDocument {
            id: Uuid::new_v4(),
            locale: "en".to_string(),
            shared: Some(json!({"title": "fine", "rating": 3})),
            translation: None,
        },
    );

    let service = SchemaService::new(attribute_store, document_store);
    let report = service.recompile_and_rebuild("articles").await?;
    assert_eq!(report.documents, 2);
    assert_eq!(report.degraded, 1);
    Ok(())
}

/// The service owns its stores; expose the document store for assertions
fn service_store<'a>(
    service: &'a SchemaService<common::MemoryAttributeStore, common::MemoryDocumentStore>,
) -> &'a common::MemoryDocumentStore {
    service.document_store()
}
