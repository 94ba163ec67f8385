//! Ingestion orchestrator
//!
//! Drives one batch through two write phases against the store:
//!
//! 1. all nodes, translated in order, as a single batched object write
//! 2. one cross-reference per relationship, sequentially, in input order
//!
//! Both phases fail fast. A refused object stops the call before any edge
//! is written, and the first refused edge stops the remaining ones. Writes
//! that already landed are not rolled back, so a failed call can leave the
//! store partially written. Dropping the future (e.g. a cancelled request)
//! stops further store calls with the same caveat.

use serde::Serialize;

use crate::node::{IngestionBatch, Relationship};
use crate::store::{AST_NODE_CLASS, ObjectStore, StoreObject};
use crate::translate::translate_node;
use crate::{Error, Result};

/// Outcome of a successful ingest call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub message: String,
    /// Ids of the written nodes, in input order
    pub ingested_node_ids: Vec<String>,
    pub relationships_created: usize,
}

impl IngestSummary {
    fn nothing_ingested() -> Self {
        Self {
            message: "No nodes to ingest".to_string(),
            ingested_node_ids: Vec::new(),
            relationships_created: 0,
        }
    }
}

/// Stateless across calls; the store handle is the only thing it holds.
pub struct Ingestor<S> {
    store: S,
}

impl<S: ObjectStore> Ingestor<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Ingest one batch: nodes first, then relationships.
    pub async fn ingest<A: Serialize>(&self, batch: IngestionBatch<A>) -> Result<IngestSummary> {
        tracing::info!(
            "Received ingest request with {} nodes and {} relationships",
            batch.nodes.len(),
            batch.relationships.len()
        );

        if batch.is_empty() {
            return Ok(IngestSummary::nothing_ingested());
        }

        let objects = translate_all(&batch);
        self.write_objects(&objects).await?;
        let created = self.create_references(&batch.relationships).await?;

        tracing::info!(
            "Successfully ingested {} nodes and {} relationships",
            objects.len(),
            created
        );

        Ok(IngestSummary {
            message: format!(
                "Successfully ingested {} nodes and {} relationships.",
                objects.len(),
                created
            ),
            ingested_node_ids: batch.node_ids(),
            relationships_created: created,
        })
    }

    async fn write_objects(&self, objects: &[StoreObject]) -> Result<()> {
        let result = self.store.batch_write_objects(objects).await.map_err(|e| {
            tracing::error!("Error during batch node ingestion: {}", e);
            Error::NodeWrite(e.to_string())
        })?;

        if let Some(failed) = result.first_error() {
            let reason = failed.errors.join("; ");
            tracing::error!("Store refused object {}: {}", failed.id, reason);
            return Err(Error::NodeWrite(format!("object {}: {}", failed.id, reason)));
        }

        if result.results.len() != objects.len() {
            return Err(Error::NodeWrite(format!(
                "store acknowledged {} of {} objects",
                result.results.len(),
                objects.len()
            )));
        }

        Ok(())
    }

    async fn create_references(&self, relationships: &[Relationship]) -> Result<usize> {
        for rel in relationships {
            self.store
                .create_reference(
                    &rel.source_node_id,
                    &rel.relationship_type,
                    AST_NODE_CLASS,
                    &rel.target_node_id,
                )
                .await
                .map_err(|e| {
                    tracing::error!("Error creating relationship {}: {}", rel, e);
                    Error::ReferenceWrite {
                        relationship: rel.to_string(),
                        reason: e.to_string(),
                    }
                })?;
        }
        Ok(relationships.len())
    }
}

fn translate_all<A: Serialize>(batch: &IngestionBatch<A>) -> Vec<StoreObject> {
    batch
        .nodes
        .iter()
        .map(|node| {
            let translation = translate_node(node);
            if let Some(warning) = &translation.warning {
                tracing::warn!("{}", warning);
            }
            translation.object
        })
        .collect()
}
