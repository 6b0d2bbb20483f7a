//! Cart line item record.

use cloudmart_core::{CartItemId, ProductId, Quantity, UserId};
use serde::{Deserialize, Serialize};

/// One line of a user's cart.
///
/// At most one line exists per (user, product) pair; adding the same product
/// again overwrites `quantity`. The product reference is not checked against
/// the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Unique line ID (UUID v4).
    pub id: CartItemId,
    /// Owner of the cart; also the partition key.
    pub user_id: UserId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Units of the product.
    pub quantity: Quantity,
}

impl CartItem {
    /// Create a new line with a freshly generated ID.
    #[must_use]
    pub fn new(user_id: UserId, product_id: ProductId, quantity: Quantity) -> Self {
        Self {
            id: CartItemId::generate(),
            user_id,
            product_id,
            quantity,
        }
    }
}
