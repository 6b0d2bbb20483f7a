//! Cart route handlers.
//!
//! There is no login: carts belong to the configured demo user unless the
//! request names another with `?user_id=`.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use cloudmart_core::{ProductId, Quantity};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::CartItem;
use crate::routes::UserQuery;
use crate::services::{CartService, ServiceError};
use crate::state::AppState;

/// Body of `POST /api/v1/cart/items`.
#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: String,
    /// Defaults to 1. Kept signed so out-of-range values reach validation
    /// instead of failing deserialization.
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// Show the user's cart.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(who): Query<UserQuery>,
) -> Result<Json<Vec<CartItem>>> {
    let user = who.resolve(&state);
    let cart = CartService::new(state.store()?);
    let items = cart.get_cart(&user).await?;
    Ok(Json(items))
}

/// Add a product to the cart, overwriting the quantity of an existing line.
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    Query(who): Query<UserQuery>,
    payload: std::result::Result<Json<AddCartItemRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(request) = payload?;
    let quantity = Quantity::new(request.quantity).map_err(ServiceError::from)?;
    let product_id = ProductId::new(request.product_id);
    if product_id.as_str().is_empty() {
        return Err(AppError::BadRequest("product_id must not be empty".to_string()));
    }

    let user = who.resolve(&state);
    let cart = CartService::new(state.store()?);
    cart.add_item(&user, &product_id, quantity).await?;

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[
            ("product_id", product_id.as_str()),
            ("quantity", quantity.to_string().as_str()),
        ]),
    );

    Ok(Json(json!({ "message": "Item added to cart" })))
}

/// Remove a product from the cart. Succeeds even if it was not there.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Query(who): Query<UserQuery>,
) -> Result<Json<Value>> {
    let product_id = ProductId::new(product_id);
    let user = who.resolve(&state);
    let cart = CartService::new(state.store()?);
    let removed = cart.remove_item(&user, &product_id).await?;

    add_breadcrumb(
        "cart",
        "Removed item",
        Some(&[("product_id", product_id.as_str())]),
    );
    tracing::debug!(removed, "cart item removal");

    Ok(Json(json!({ "message": "Item removed from cart" })))
}
