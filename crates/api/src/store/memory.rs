//! Process-local document store.
//!
//! Used by tests and by `CLOUDMART_STORE=memory`. Data is lost when the
//! process exits. Batches are staged against a copy of the data and only
//! published if every write succeeds.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::instrument;

use super::{Collection, DocumentStore, Filter, StoreError, WriteOp, document_key};

#[derive(Debug, Clone)]
struct StoredDocument {
    id: String,
    partition_key: String,
    body: Value,
}

type Collections = HashMap<Collection, Vec<StoredDocument>>;

/// In-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents held in a collection.
    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

fn apply(collections: &mut Collections, op: WriteOp) -> Result<(), StoreError> {
    match op {
        WriteOp::Create {
            collection,
            document,
        } => {
            let key = document_key(collection, &document)?;
            let docs = collections.entry(collection).or_default();
            if docs.iter().any(|d| d.id == key.id) {
                return Err(StoreError::Conflict {
                    collection,
                    id: key.id,
                });
            }
            docs.push(StoredDocument {
                id: key.id,
                partition_key: key.partition_key,
                body: document,
            });
        }
        WriteOp::Upsert {
            collection,
            document,
        } => {
            let key = document_key(collection, &document)?;
            let docs = collections.entry(collection).or_default();
            if let Some(existing) = docs.iter_mut().find(|d| d.id == key.id) {
                existing.partition_key = key.partition_key;
                existing.body = document;
            } else {
                docs.push(StoredDocument {
                    id: key.id,
                    partition_key: key.partition_key,
                    body: document,
                });
            }
        }
        WriteOp::Delete {
            collection,
            id,
            partition_key,
        } => {
            if let Some(docs) = collections.get_mut(&collection) {
                docs.retain(|d| !(d.id == id && d.partition_key == partition_key));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    #[instrument(skip(self, document))]
    async fn create(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        apply(
            &mut guard,
            WriteOp::Create {
                collection,
                document,
            },
        )
    }

    #[instrument(skip(self))]
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filters.iter().all(|f| f.matches(&d.body)))
                    .map(|d| d.body.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self, document))]
    async fn upsert(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        apply(
            &mut guard,
            WriteOp::Upsert {
                collection,
                document,
            },
        )
    }

    #[instrument(skip(self))]
    async fn delete_by_id(
        &self,
        collection: Collection,
        id: &str,
        partition_key: &str,
    ) -> Result<bool, StoreError> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(&collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| !(d.id == id && d.partition_key == partition_key));
        Ok(docs.len() < before)
    }

    #[instrument(skip(self, ops), fields(op_count = ops.len()))]
    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut guard = self.collections.write().await;
        let mut staged = guard.clone();
        for op in ops {
            apply(&mut staged, op)?;
        }
        *guard = staged;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
