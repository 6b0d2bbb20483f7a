//! Document store adapter.
//!
//! Records are schema-flexible JSON documents grouped into logical
//! [`Collection`]s. Every document carries a string `id` (unique within its
//! collection) and a partition key taken from a collection-specific field.
//!
//! # Implementations
//!
//! - [`PgDocumentStore`] - `PostgreSQL` JSONB table (`documents`)
//! - [`MemoryDocumentStore`] - process-local maps for tests and demo mode
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p cloudmart-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store is not configured or cannot be reached.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// A document with the same id already exists in the collection.
    #[error("document {id} already exists in {collection}")]
    Conflict {
        /// Collection that rejected the write.
        collection: Collection,
        /// Conflicting document id.
        id: String,
    },

    /// Document is missing its id or partition key, or is not an object.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Record could not be converted to or from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => Self::Unavailable(err.to_string()),
            other => Self::Database(other),
        }
    }
}

/// Logical collections held by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Products,
    Cart,
    Orders,
}

impl Collection {
    /// Name the collection is stored under.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Cart => "cart",
            Self::Orders => "orders",
        }
    }

    /// Document field whose value is the partition key.
    #[must_use]
    pub const fn partition_key_field(self) -> &'static str {
        match self {
            Self::Products => "id",
            Self::Cart | Self::Orders => "user_id",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// String equality filter on a top-level document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: &'static str,
    pub value: String,
}

impl Filter {
    /// Match documents whose `field` equals `value`.
    #[must_use]
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// Whether `document` satisfies this filter.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        document.get(self.field).and_then(Value::as_str) == Some(self.value.as_str())
    }
}

/// A single write submitted as part of a [`DocumentStore::batch`].
#[derive(Debug, Clone)]
pub enum WriteOp {
    Create {
        collection: Collection,
        document: Value,
    },
    Upsert {
        collection: Collection,
        document: Value,
    },
    Delete {
        collection: Collection,
        id: String,
        partition_key: String,
    },
}

/// Storage operations on JSON documents.
///
/// Implementations must be thread-safe (`Send + Sync`); the API shares one
/// instance behind an `Arc` for the lifetime of the process.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Insert a new document. Fails with [`StoreError::Conflict`] if the id exists.
    async fn create(&self, collection: Collection, document: Value) -> Result<(), StoreError>;

    /// Return documents matching every filter (all documents for an empty slice),
    /// in insertion order.
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError>;

    /// Insert a document, replacing any existing document with the same id.
    async fn upsert(&self, collection: Collection, document: Value) -> Result<(), StoreError>;

    /// Delete a document. Returns `true` if it existed.
    async fn delete_by_id(
        &self,
        collection: Collection,
        id: &str,
        partition_key: &str,
    ) -> Result<bool, StoreError>;

    /// Apply several writes.
    ///
    /// The default applies them one at a time and stops at the first error,
    /// leaving earlier writes in place. Backends that can should override it
    /// to apply all writes or none.
    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        for op in ops {
            match op {
                WriteOp::Create {
                    collection,
                    document,
                } => self.create(collection, document).await?,
                WriteOp::Upsert {
                    collection,
                    document,
                } => self.upsert(collection, document).await?,
                WriteOp::Delete {
                    collection,
                    id,
                    partition_key,
                } => {
                    self.delete_by_id(collection, &id, &partition_key).await?;
                }
            }
        }
        Ok(())
    }

    /// Check connectivity.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Identity of a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentKey {
    pub id: String,
    pub partition_key: String,
}

/// Extract the id and partition key from a document.
///
/// # Errors
///
/// Returns [`StoreError::InvalidDocument`] if the document is not an object or
/// either field is missing or not a non-empty string.
pub fn document_key(collection: Collection, document: &Value) -> Result<DocumentKey, StoreError> {
    if !document.is_object() {
        return Err(StoreError::InvalidDocument(format!(
            "{collection} documents must be JSON objects"
        )));
    }

    let string_field = |field: &str| {
        document
            .get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                StoreError::InvalidDocument(format!(
                    "{collection} document is missing string field '{field}'"
                ))
            })
    };

    Ok(DocumentKey {
        id: string_field("id")?,
        partition_key: string_field(collection.partition_key_field())?,
    })
}

// =============================================================================
// Typed helpers
// =============================================================================

/// Serialize a record into a document.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if the record cannot be serialized.
pub fn to_document<T: Serialize>(record: &T) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(record)?)
}

/// Deserialize a document into a record.
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if the document does not match `T`.
pub fn from_document<T: DeserializeOwned>(document: Value) -> Result<T, StoreError> {
    Ok(serde_json::from_value(document)?)
}

/// Insert a typed record.
///
/// # Errors
///
/// Propagates serialization and store errors.
pub async fn create_record<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    collection: Collection,
    record: &T,
) -> Result<(), StoreError> {
    let document = to_document(record)?;
    store.create(collection, document).await
}

/// Insert or replace a typed record.
///
/// # Errors
///
/// Propagates serialization and store errors.
pub async fn upsert_record<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    collection: Collection,
    record: &T,
) -> Result<(), StoreError> {
    let document = to_document(record)?;
    store.upsert(collection, document).await
}

/// Query and deserialize typed records.
///
/// # Errors
///
/// Propagates store errors; returns [`StoreError::Serialization`] if any
/// document does not match `T`.
pub async fn query_records<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: Collection,
    filters: &[Filter],
) -> Result<Vec<T>, StoreError> {
    store
        .query(collection, filters)
        .await?
        .into_iter()
        .map(from_document)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_document_key_uses_partition_field() {
        let doc = json!({"id": "abc", "user_id": "demo_user", "quantity": 1});
        let key = document_key(Collection::Cart, &doc).ok();
        assert_eq!(
            key,
            Some(DocumentKey {
                id: "abc".to_string(),
                partition_key: "demo_user".to_string(),
            })
        );

        let product = json!({"id": "1", "category": "Home"});
        assert_eq!(
            document_key(Collection::Products, &product)
                .ok()
                .map(|k| k.partition_key),
            Some("1".to_string())
        );
    }

    #[test]
    fn test_document_key_rejects_missing_fields() {
        let doc = json!({"id": "abc"});
        assert!(matches!(
            document_key(Collection::Orders, &doc),
            Err(StoreError::InvalidDocument(_))
        ));
        assert!(matches!(
            document_key(Collection::Products, &json!([1, 2])),
            Err(StoreError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_filter_matches_strings_only() {
        let doc = json!({"category": "Home", "stock": 5});
        assert!(Filter::eq("category", "Home").matches(&doc));
        assert!(!Filter::eq("category", "home").matches(&doc));
        assert!(!Filter::eq("stock", "5").matches(&doc));
        assert!(!Filter::eq("missing", "x").matches(&doc));
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
