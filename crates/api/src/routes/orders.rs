//! Order route handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::models::Order;
use crate::routes::UserQuery;
use crate::services::OrderService;
use crate::state::AppState;

/// Check out the user's cart.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    Query(who): Query<UserQuery>,
) -> Result<(StatusCode, Json<Order>)> {
    let user = who.resolve(&state);
    let orders = OrderService::new(state.store()?);
    let order = orders.create_order(&user).await?;

    add_breadcrumb("orders", "Placed order", Some(&[("order_id", order.id.as_str())]));

    Ok((StatusCode::CREATED, Json(order)))
}

/// List the user's orders, oldest first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(who): Query<UserQuery>,
) -> Result<Json<Vec<Order>>> {
    let user = who.resolve(&state);
    let orders = OrderService::new(state.store()?);
    Ok(Json(orders.list_orders(&user).await?))
}
