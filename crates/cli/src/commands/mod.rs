//! Subcommand implementations.
//!
//! Every command talks to `PostgreSQL` directly; the in-memory backend only
//! lives inside a running API process.

pub mod migrate;
pub mod seed;
pub mod sweep;

use cloudmart_api::config::{ApiConfig, ConfigError};
use cloudmart_api::services::ServiceError;
use cloudmart_api::store::{PgDocumentStore, StoreError};
use thiserror::Error;

/// Errors returned by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Load configuration and connect to the configured database.
async fn connect() -> Result<(ApiConfig, PgDocumentStore), CommandError> {
    let config = ApiConfig::from_env()?;
    let url = config
        .database_url
        .clone()
        .ok_or_else(|| ConfigError::MissingEnvVar("CLOUDMART_DATABASE_URL".to_string()))?;

    tracing::info!("Connecting to database...");
    let store = PgDocumentStore::connect(&url).await?;
    Ok((config, store))
}
