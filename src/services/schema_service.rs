use futures::StreamExt;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::config;
use crate::content::rebuild::rebuild;
use crate::error::Error;
use crate::schema::attribute::{field_paths, AttributeDefinition, ComponentBlueprint};
use crate::schema::compiler::compile_versioned;
use crate::schema::node::CompiledSchema;
use crate::services::stores::{AttributeStore, DocumentStore, StoredDocument};

/// Outcome of one recompile-and-rebuild pass over a collection
#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub collection: String,
    pub schema_version: Uuid,
    pub documents: usize,
    pub degraded: usize,
    pub failed: usize,
    pub execution_time: Duration,
}

/// Orchestrates schema recompilation and the document rebuild fan-out.
///
/// Invoked directly by whatever mutates attributes; there is no event bus.
/// A compile failure aborts before anything is persisted, so a half-compiled
/// schema can never reach the store or drive a rebuild.
pub struct SchemaService<A, D> {
    attributes: A,
    documents: D,
}

impl<A: AttributeStore, D: DocumentStore> SchemaService<A, D> {
    pub fn new(attributes: A, documents: D) -> Self {
        Self {
            attributes,
            documents,
        }
    }

    /// The underlying document store, for callers that read back persisted
    /// output
    pub fn document_store(&self) -> &D {
        &self.documents
    }

    /// Recompile a collection's schema and persist it with recomputed field
    /// paths. Returns the compiled version for the caller to fence writes on.
    pub async fn recompile(&self, collection: &str) -> Result<CompiledSchema, Error> {
        let attributes = self.attributes.attributes(collection).await?;
        let resolver = self.load_blueprints(&attributes).await?;

        let compiled = compile_versioned(&attributes, &resolver)?;
        let paths = field_paths(&attributes, &resolver)?;

        tracing::info!(
            "Compiled schema for '{}': version={}, checksum={}, {} fields, {} paths",
            collection,
            compiled.version,
            &compiled.checksum[..12.min(compiled.checksum.len())],
            compiled.field_count,
            paths.len()
        );

        self.documents
            .persist_schema(collection, &compiled, &paths)
            .await?;

        Ok(compiled)
    }

    /// Recompile, then re-derive every stored pair against the new schema.
    ///
    /// One rebuild task per stored document, awaited as a batch with bounded
    /// concurrency so a schema edit neither serializes thousands of updates
    /// nor floods the document store. Per-document persistence failures are
    /// counted and logged, never fatal to the batch; document-level rebuild
    /// is idempotent, so a raced pass converges on the same result.
    pub async fn recompile_and_rebuild(&self, collection: &str) -> Result<RebuildReport, Error> {
        let start_time = Instant::now();
        let compiled = self.recompile(collection).await?;

        let pairs = self.documents.document_pairs(collection).await?;
        let total = pairs.len();

        tracing::info!(
            "Rebuild pass starting: collection={}, documents={}, concurrency={}",
            collection,
            total,
            config::config().rebuild.concurrency
        );

        let root = &compiled.root;
        let documents = &self.documents;
        let results: Vec<(bool, bool)> = futures::stream::iter(pairs.into_iter().map(|pair| {
            async move {
                let outcome = rebuild(pair.shared.as_ref(), pair.translation.as_ref(), root);
                let degraded = outcome.stats.degraded();
                if degraded {
                    tracing::warn!(
                        "Document {} ({}) degraded during rebuild: {:?}",
                        pair.id,
                        pair.locale,
                        outcome.stats
                    );
                }

                let rebuilt = StoredDocument {
                    id: pair.id,
                    locale: pair.locale,
                    shared: outcome.shared,
                    translation: outcome.translation,
                };
                let persisted = documents.persist_pair(collection, &rebuilt).await;
                if let Err(err) = &persisted {
                    tracing::warn!(
                        "Failed to persist rebuilt document {}: {}",
                        rebuilt.id,
                        err
                    );
                }
                (degraded, persisted.is_err())
            }
        }))
        .buffer_unordered(config::config().rebuild.concurrency)
        .collect()
        .await;

        let degraded = results.iter().filter(|(d, _)| *d).count();
        let failed = results.iter().filter(|(_, f)| *f).count();
        let execution_time = start_time.elapsed();

        if execution_time.as_millis() as u64 > config::config().rebuild.slow_rebuild_threshold_ms {
            tracing::warn!(
                "Slow rebuild pass for '{}': {:?} over {} documents",
                collection,
                execution_time,
                total
            );
        }

        tracing::info!(
            "Rebuild pass finished: collection={}, documents={}, degraded={}, failed={}, took {:?}",
            collection,
            total,
            degraded,
            failed,
            execution_time
        );

        Ok(RebuildReport {
            collection: collection.to_string(),
            schema_version: compiled.version,
            documents: total,
            degraded,
            failed,
            execution_time,
        })
    }

    /// Pre-load every blueprint the attribute list transitively references.
    /// Compilation itself is pure and sync, so resolution happens up front.
    async fn load_blueprints(
        &self,
        attributes: &[AttributeDefinition],
    ) -> Result<HashMap<String, ComponentBlueprint>, Error> {
        let mut resolved: HashMap<String, ComponentBlueprint> = HashMap::new();
        let mut pending: Vec<String> = component_refs(attributes);

        while let Some(key) = pending.pop() {
            if resolved.contains_key(&key) {
                continue;
            }
            // Unknown refs are left out; the compiler reports them with the
            // attribute that used them
            if let Some(blueprint) = self.attributes.blueprint(&key).await? {
                pending.extend(component_refs(&blueprint.attributes));
                resolved.insert(key, blueprint);
            }
        }

        Ok(resolved)
    }
}

fn component_refs(attributes: &[AttributeDefinition]) -> Vec<String> {
    attributes
        .iter()
        .filter_map(|attr| match attr {
            AttributeDefinition::Component(comp) => Some(comp.component_ref.clone()),
            _ => None,
        })
        .collect()
}
