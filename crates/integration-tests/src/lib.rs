//! Integration tests for CloudMart.
//!
//! Tests build the real router with [`cloudmart_api::app`] over an in-memory
//! document store and drive it with `tower::ServiceExt::oneshot`, so no
//! server or database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cloudmart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_products` - Catalog listing, lookup and categories
//! - `api_cart` - Add, overwrite and remove cart lines
//! - `api_orders` - Checkout and order history
//! - `api_health` - Banner, health and readiness, including the no-store case

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use cloudmart_api::config::ApiConfig;
use cloudmart_api::seed::{SeedMode, seed_products};
use cloudmart_api::state::AppState;
use cloudmart_api::store::{DocumentStore, MemoryDocumentStore};
use serde_json::Value;
use tower::ServiceExt;

/// Router plus a handle on the store behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDocumentStore>,
}

impl TestApp {
    /// App over an in-memory store holding the demo catalog.
    ///
    /// # Panics
    ///
    /// Panics if seeding the in-memory store fails.
    pub async fn seeded() -> Self {
        let app = Self::empty();
        seed_products(app.store.as_ref(), SeedMode::IfEmpty)
            .await
            .expect("seeding an in-memory store");
        app
    }

    /// App over an empty in-memory store.
    #[must_use]
    pub fn empty() -> Self {
        let store = Arc::new(MemoryDocumentStore::new());
        let shared: Arc<dyn DocumentStore> = store.clone();
        let state = AppState::new(ApiConfig::for_memory_store(), Some(shared));
        Self {
            router: cloudmart_api::app(state),
            store,
        }
    }

    /// Send a request and return the status and decoded JSON body.
    ///
    /// An empty response body decodes to `Value::Null`.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send(self.router.clone(), method, uri, body).await
    }

    /// `GET` shorthand for [`TestApp::request`].
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }
}

/// App with no document store configured.
#[must_use]
pub fn app_without_store() -> Router {
    app_with_postgres(None)
}

/// App configured for `PostgreSQL`, served by `store` if one is given.
#[must_use]
pub fn app_with_postgres(store: Option<Arc<dyn DocumentStore>>) -> Router {
    let config = ApiConfig {
        store_backend: cloudmart_api::config::StoreBackend::Postgres,
        ..ApiConfig::for_memory_store()
    };
    cloudmart_api::app(AppState::new(config, store))
}

/// Send one request through `router`.
///
/// # Panics
///
/// Panics if the request cannot be built or the body is not JSON.
pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = router.oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON response body")
    };
    (status, json)
}
