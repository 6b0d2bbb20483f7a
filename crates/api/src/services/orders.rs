//! Order service.
//!
//! Checkout reads the cart, writes one order and clears the consumed lines in
//! a single [`DocumentStore::batch`]. Backends whose batch is not atomic can
//! leave consumed lines behind after a partial failure; those are recovered
//! with [`OrderService::sweep_orphaned_cart_items`].

use std::collections::HashSet;

use chrono::Utc;
use cloudmart_core::{CartItemId, UserId};
use tracing::{info, instrument, warn};

use super::{CartService, ServiceError};
use crate::models::Order;
use crate::store::{Collection, DocumentStore, Filter, WriteOp, query_records, to_document};

/// Checkout and order history.
pub struct OrderService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Turn the user's cart into a confirmed order and empty the cart.
    ///
    /// Quantities are snapshotted; later catalog or cart changes do not touch
    /// the order. Stock and payment are not checked.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the cart is empty.
    /// Returns `ServiceError::Store` if reading the cart or writing the batch
    /// fails; in that case neither the order nor the cart change is visible.
    #[instrument(skip(self, user), fields(user_id = %user))]
    pub async fn create_order(&self, user: &UserId) -> Result<Order, ServiceError> {
        let cart = CartService::new(self.store).get_cart(user).await?;
        if cart.is_empty() {
            return Err(ServiceError::Validation("cart is empty".to_string()));
        }

        let order = Order::from_cart(user.clone(), &cart, Utc::now());

        let mut ops = Vec::with_capacity(cart.len() + 1);
        ops.push(WriteOp::Create {
            collection: Collection::Orders,
            document: to_document(&order)?,
        });
        ops.extend(cart.iter().map(|line| WriteOp::Delete {
            collection: Collection::Cart,
            id: line.id.to_string(),
            partition_key: user.to_string(),
        }));

        self.store.batch(ops).await?;

        info!(
            order_id = %order.id,
            line_count = order.items.len(),
            "order created"
        );
        Ok(order)
    }

    /// All orders placed by `user`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store query fails.
    #[instrument(skip(self, user), fields(user_id = %user))]
    pub async fn list_orders(&self, user: &UserId) -> Result<Vec<Order>, ServiceError> {
        let mut orders: Vec<Order> = query_records(
            self.store,
            Collection::Orders,
            &[Filter::eq("user_id", user.as_str())],
        )
        .await?;

        orders.sort_by_key(|o| o.created_at);
        Ok(orders)
    }

    /// Delete cart lines that an existing order already consumed.
    ///
    /// Returns the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if a store call fails.
    #[instrument(skip(self, user), fields(user_id = %user))]
    pub async fn sweep_orphaned_cart_items(&self, user: &UserId) -> Result<usize, ServiceError> {
        let consumed: HashSet<CartItemId> = self
            .list_orders(user)
            .await?
            .into_iter()
            .flat_map(|order| order.source_cart_item_ids)
            .collect();
        if consumed.is_empty() {
            return Ok(0);
        }

        let cart = CartService::new(self.store).get_cart(user).await?;
        let mut removed = 0;
        for line in cart.iter().filter(|line| consumed.contains(&line.id)) {
            if self
                .store
                .delete_by_id(Collection::Cart, line.id.as_str(), user.as_str())
                .await?
            {
                removed += 1;
            }
        }

        if removed > 0 {
            warn!(removed, "removed cart lines already consumed by an order");
        }
        Ok(removed)
    }
}
