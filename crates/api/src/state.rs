//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cloudmart_core::UserId;

use crate::config::{ApiConfig, StoreBackend};
use crate::error::AppError;
use crate::store::{DocumentStore, MemoryDocumentStore, PgDocumentStore, StoreError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the document store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    store: Option<Arc<dyn DocumentStore>>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `store` - Document store, or `None` to serve 503 from data endpoints
    #[must_use]
    pub fn new(config: ApiConfig, store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                started_at: Utc::now(),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Borrow the document store.
    ///
    /// # Errors
    ///
    /// Returns a 503 `AppError` when no store is configured.
    pub fn store(&self) -> Result<&dyn DocumentStore, AppError> {
        self.inner.store.as_deref().ok_or_else(|| {
            AppError::Store(StoreError::Unavailable(
                "document store is not configured".to_string(),
            ))
        })
    }

    /// Shared handle to the document store, if one is configured.
    #[must_use]
    pub fn store_handle(&self) -> Option<Arc<dyn DocumentStore>> {
        self.inner.store.clone()
    }

    /// Identity that owns the cart and orders.
    #[must_use]
    pub fn demo_user(&self) -> &UserId {
        &self.inner.config.demo_user
    }

    /// When this process started serving.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }
}

/// Build the document store selected by `config`.
///
/// Returns `None` (and logs a warning) when the `PostgreSQL` backend is
/// selected but no usable database URL is configured.
#[must_use]
pub fn open_store(config: &ApiConfig) -> Option<Arc<dyn DocumentStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory document store");
            Some(Arc::new(MemoryDocumentStore::new()))
        }
        StoreBackend::Postgres => {
            let Some(url) = config.database_url.as_ref() else {
                tracing::warn!(
                    "CLOUDMART_DATABASE_URL is not set; data endpoints will answer 503"
                );
                return None;
            };
            match PgDocumentStore::connect_lazy(url) {
                Ok(store) => {
                    tracing::info!("PostgreSQL document store configured");
                    Some(Arc::new(store))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid database URL; data endpoints will answer 503");
                    None
                }
            }
        }
    }
}
