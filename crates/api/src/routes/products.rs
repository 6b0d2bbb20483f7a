//! Catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use cloudmart_core::ProductId;
use serde::Deserialize;
use tracing::instrument;

use crate::error::Result;
use crate::models::Product;
use crate::services::CatalogService;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Exact, case-sensitive category name.
    pub category: Option<String>,
}

/// List products, optionally restricted to one category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let catalog = CatalogService::new(state.store()?);
    let products = catalog.list_products(query.category.as_deref()).await?;
    Ok(Json(products))
}

/// Show a single product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let catalog = CatalogService::new(state.store()?);
    let product = catalog.get_product(&ProductId::new(id)).await?;
    Ok(Json(product))
}

/// List distinct categories, sorted.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let catalog = CatalogService::new(state.store()?);
    let categories = catalog.list_categories().await?;
    Ok(Json(categories.into_iter().collect()))
}
