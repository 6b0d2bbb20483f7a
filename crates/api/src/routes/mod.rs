//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                              - Service banner
//! GET    /health                        - Health summary (store backend and status)
//! GET    /health/ready                  - Readiness (503 until the store answers)
//!
//! # Catalog
//! GET    /api/v1/products?category=     - Product listing, optional exact category
//! GET    /api/v1/products/{id}          - Product detail
//! GET    /api/v1/categories             - Distinct categories
//!
//! Cart and order routes act for the configured demo user unless a
//! `?user_id=` query parameter names another one.
//!
//! # Cart
//! GET    /api/v1/cart                   - Cart lines
//! POST   /api/v1/cart/items             - Add or overwrite a line
//! DELETE /api/v1/cart/items/{product_id} - Remove a product's lines
//!
//! # Orders
//! POST   /api/v1/orders                 - Checkout the cart
//! GET    /api/v1/orders                 - Order history
//! ```

pub mod cart;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post},
};
use cloudmart_core::UserId;
use serde::Deserialize;

use crate::state::AppState;

/// Optional `?user_id=` override for cart and order routes.
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

impl UserQuery {
    /// The requested user, or the configured demo user when absent or blank.
    #[must_use]
    pub fn resolve(self, state: &AppState) -> UserId {
        self.user_id
            .filter(|id| !id.trim().is_empty())
            .map_or_else(|| state.demo_user().clone(), UserId::new)
    }
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(products::categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/items", post(cart::add))
        .route("/cart/items/{product_id}", delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/orders", get(orders::index).post(orders::create))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest(
            "/api/v1",
            Router::new()
                .merge(catalog_routes())
                .merge(cart_routes())
                .merge(order_routes()),
        )
}
