//! `PostgreSQL` document store.
//!
//! # Table: `documents`
//!
//! | column          | type          |                                   |
//! |-----------------|---------------|-----------------------------------|
//! | `collection`    | `TEXT`        | primary key (with `id`)           |
//! | `id`            | `TEXT`        | primary key (with `collection`)   |
//! | `partition_key` | `TEXT`        | indexed with `collection`         |
//! | `body`          | `JSONB`       | the full document                 |
//! | `inserted_at`   | `TIMESTAMPTZ` | query result ordering             |
//! | `updated_at`    | `TIMESTAMPTZ` | bumped on upsert                  |
//!
//! Filters compare `body -> field` against a JSON string, so only string
//! fields match. Batches run inside a single transaction.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;

use super::{Collection, DocumentKey, DocumentStore, Filter, StoreError, WriteOp, document_key};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool without opening any connection yet.
///
/// Connections are established on first use, so an unreachable database
/// surfaces as [`StoreError::Unavailable`] on each request instead of failing
/// startup.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection string cannot be parsed.
pub fn create_lazy_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(0)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url.expose_secret())
}

/// [`DocumentStore`] backed by a `PostgreSQL` JSONB table.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection cannot be established.
    pub async fn connect(database_url: &SecretString) -> Result<Self, sqlx::Error> {
        Ok(Self::new(create_pool(database_url).await?))
    }

    /// Create a store whose pool connects on first use.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection string cannot be parsed.
    pub fn connect_lazy(database_url: &SecretString) -> Result<Self, sqlx::Error> {
        Ok(Self::new(create_lazy_pool(database_url)?))
    }

    /// Run pending migrations from `crates/api/migrations/`.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError` if a migration fails to apply.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

/// Build the `SELECT` for a filtered query. Parameters: `$1` collection,
/// then one (field, value) pair per filter.
fn select_sql(filter_count: usize) -> String {
    let mut sql = String::from("SELECT body FROM documents WHERE collection = $1");
    for i in 0..filter_count {
        let field = 2 + i * 2;
        let value = field + 1;
        sql.push_str(&format!(" AND body -> ${field}::text = to_jsonb(${value}::text)"));
    }
    sql.push_str(" ORDER BY inserted_at, id");
    sql
}

fn map_insert_error(err: sqlx::Error, collection: Collection, id: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict {
            collection,
            id: id.to_owned(),
        };
    }
    StoreError::from(err)
}

async fn insert_document<'e>(
    executor: impl PgExecutor<'e>,
    collection: Collection,
    key: &DocumentKey,
    document: &Value,
) -> Result<(), StoreError> {
    sqlx::query(
        r"
        INSERT INTO documents (collection, id, partition_key, body)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(collection.name())
    .bind(key.id.as_str())
    .bind(key.partition_key.as_str())
    .bind(Json(document))
    .execute(executor)
    .await
    .map_err(|e| map_insert_error(e, collection, &key.id))?;

    Ok(())
}

async fn upsert_document<'e>(
    executor: impl PgExecutor<'e>,
    collection: Collection,
    key: &DocumentKey,
    document: &Value,
) -> Result<(), StoreError> {
    sqlx::query(
        r"
        INSERT INTO documents (collection, id, partition_key, body)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (collection, id) DO UPDATE
        SET partition_key = EXCLUDED.partition_key,
            body = EXCLUDED.body,
            updated_at = now()
        ",
    )
    .bind(collection.name())
    .bind(key.id.as_str())
    .bind(key.partition_key.as_str())
    .bind(Json(document))
    .execute(executor)
    .await?;

    Ok(())
}

async fn delete_document<'e>(
    executor: impl PgExecutor<'e>,
    collection: Collection,
    id: &str,
    partition_key: &str,
) -> Result<bool, StoreError> {
    let result = sqlx::query(
        r"
        DELETE FROM documents
        WHERE collection = $1 AND id = $2 AND partition_key = $3
        ",
    )
    .bind(collection.name())
    .bind(id)
    .bind(partition_key)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    #[instrument(skip(self, document))]
    async fn create(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        let key = document_key(collection, &document)?;
        insert_document(&self.pool, collection, &key, &document).await
    }

    #[instrument(skip(self))]
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<Vec<Value>, StoreError> {
        let sql = select_sql(filters.len());
        let mut query = sqlx::query_scalar::<_, Json<Value>>(&sql).bind(collection.name());
        for filter in filters {
            query = query.bind(filter.field).bind(filter.value.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|Json(body)| body).collect())
    }

    #[instrument(skip(self, document))]
    async fn upsert(&self, collection: Collection, document: Value) -> Result<(), StoreError> {
        let key = document_key(collection, &document)?;
        upsert_document(&self.pool, collection, &key, &document).await
    }

    #[instrument(skip(self))]
    async fn delete_by_id(
        &self,
        collection: Collection,
        id: &str,
        partition_key: &str,
    ) -> Result<bool, StoreError> {
        delete_document(&self.pool, collection, id, partition_key).await
    }

    #[instrument(skip(self, ops), fields(op_count = ops.len()))]
    async fn batch(&self, ops: Vec<WriteOp>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for op in ops {
            match op {
                WriteOp::Create {
                    collection,
                    document,
                } => {
                    let key = document_key(collection, &document)?;
                    insert_document(&mut *tx, collection, &key, &document).await?;
                }
                WriteOp::Upsert {
                    collection,
                    document,
                } => {
                    let key = document_key(collection, &document)?;
                    upsert_document(&mut *tx, collection, &key, &document).await?;
                }
                WriteOp::Delete {
                    collection,
                    id,
                    partition_key,
                } => {
                    delete_document(&mut *tx, collection, &id, &partition_key).await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_select_sql_without_filters() {
        assert_eq!(
            select_sql(0),
            "SELECT body FROM documents WHERE collection = $1 ORDER BY inserted_at, id"
        );
    }

    #[test]
    fn test_select_sql_numbers_parameters_in_pairs() {
        let sql = select_sql(2);
        assert!(sql.contains("body -> $2::text = to_jsonb($3::text)"));
        assert!(sql.contains("body -> $4::text = to_jsonb($5::text)"));
        assert!(sql.ends_with("ORDER BY inserted_at, id"));
    }

    /// Round trip against a real database.
    ///
    /// Requires `CLOUDMART_TEST_DATABASE_URL` pointing at a disposable database.
    #[tokio::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_postgres_store_round_trip() {
        let url = SecretString::from(std::env::var("CLOUDMART_TEST_DATABASE_URL").unwrap());
        let store = PgDocumentStore::connect(&url).await.unwrap();
        store.migrate().await.unwrap();
        store.ping().await.unwrap();

        let user = format!("test-{}", uuid::Uuid::new_v4());
        let line = json!({"id": uuid::Uuid::new_v4().to_string(), "user_id": user, "product_id": "1", "quantity": 2});
        store.create(Collection::Cart, line.clone()).await.unwrap();

        let found = store
            .query(Collection::Cart, &[Filter::eq("user_id", user.clone())])
            .await
            .unwrap();
        assert_eq!(found, vec![line.clone()]);

        let err = store.create(Collection::Cart, line.clone()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let id = line.get("id").and_then(Value::as_str).unwrap().to_string();
        let failed = store
            .batch(vec![
                WriteOp::Delete {
                    collection: Collection::Cart,
                    id: id.clone(),
                    partition_key: user.clone(),
                },
                WriteOp::Create {
                    collection: Collection::Cart,
                    document: line.clone(),
                },
                WriteOp::Create {
                    collection: Collection::Cart,
                    document: line.clone(),
                },
            ])
            .await;
        assert!(failed.is_err());
        assert_eq!(
            store
                .query(Collection::Cart, &[Filter::eq("user_id", user.clone())])
                .await
                .unwrap()
                .len(),
            1
        );

        assert!(store.delete_by_id(Collection::Cart, &id, &user).await.unwrap());
    }

    /// Catalog, cart and checkout flows over a real database.
    ///
    /// Requires `CLOUDMART_TEST_DATABASE_URL` pointing at a disposable database.
    #[tokio::test]
    #[ignore = "requires a PostgreSQL database"]
    async fn test_services_over_postgres() {
        use cloudmart_core::{ProductId, Quantity, UserId};

        use crate::seed::{SeedMode, seed_products};
        use crate::services::{CartService, CatalogService, OrderService};

        let url = SecretString::from(std::env::var("CLOUDMART_TEST_DATABASE_URL").unwrap());
        let store = PgDocumentStore::connect(&url).await.unwrap();
        store.migrate().await.unwrap();

        let first = seed_products(&store, SeedMode::MissingOnly).await.unwrap();
        assert_eq!(first.inserted + first.skipped, 8);
        let again = seed_products(&store, SeedMode::MissingOnly).await.unwrap();
        assert_eq!((again.inserted, again.skipped), (0, 8));

        let catalog = CatalogService::new(&store);
        assert_eq!(catalog.list_products(Some("Home")).await.unwrap().len(), 2);
        assert!(catalog.list_products(Some("home")).await.unwrap().is_empty());

        let user = UserId::new(format!("test-{}", uuid::Uuid::new_v4()));
        let cart = CartService::new(&store);
        let product = ProductId::new("1");
        cart.add_item(&user, &product, Quantity::new(2).unwrap()).await.unwrap();
        cart.add_item(&user, &product, Quantity::new(4).unwrap()).await.unwrap();
        let lines = cart.get_cart(&user).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, Quantity::new(4).unwrap());

        let orders = OrderService::new(&store);
        let order = orders.create_order(&user).await.unwrap();
        assert!(cart.get_cart(&user).await.unwrap().is_empty());
        assert_eq!(orders.list_orders(&user).await.unwrap(), vec![order]);
    }
}
