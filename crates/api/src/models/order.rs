//! Order record.

use chrono::{DateTime, Utc};
use cloudmart_core::{CartItemId, OrderId, OrderStatus, ProductId, Quantity, UserId};
use serde::{Deserialize, Serialize};

use super::CartItem;

/// Snapshot of one cart line at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
        }
    }
}

/// An immutable order created from a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID (UUID v4).
    pub id: OrderId,
    /// Owner of the order; also the partition key.
    pub user_id: UserId,
    /// Lines copied from the cart, in cart order.
    pub items: Vec<OrderLine>,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
    /// Cart lines consumed by this order. Used to find lines left behind
    /// when checkout could not clear the cart.
    #[serde(default)]
    pub source_cart_item_ids: Vec<CartItemId>,
}

impl Order {
    /// Build a confirmed order from the current cart contents.
    #[must_use]
    pub fn from_cart(user_id: UserId, cart: &[CartItem], created_at: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::generate(),
            user_id,
            items: cart.iter().map(OrderLine::from).collect(),
            status: OrderStatus::Confirmed,
            created_at,
            source_cart_item_ids: cart.iter().map(|item| item.id.clone()).collect(),
        }
    }
}
