//! Cart service.
//!
//! Adding a product that is already in the cart overwrites its quantity.
//! The lookup and the write are separate store calls, so two concurrent adds
//! for the same (user, product) can both miss the lookup and create two lines.

use cloudmart_core::{ProductId, Quantity, UserId};
use tracing::{debug, instrument};

use super::ServiceError;
use crate::models::CartItem;
use crate::store::{Collection, DocumentStore, Filter, create_record, query_records, upsert_record};

/// Per-user cart operations.
pub struct CartService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// All lines in `user`'s cart, in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store query fails.
    #[instrument(skip(self, user), fields(user_id = %user))]
    pub async fn get_cart(&self, user: &UserId) -> Result<Vec<CartItem>, ServiceError> {
        Ok(query_records(
            self.store,
            Collection::Cart,
            &[Filter::eq("user_id", user.as_str())],
        )
        .await?)
    }

    /// Put `quantity` units of `product_id` in the cart.
    ///
    /// Replaces the quantity of an existing line rather than adding to it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if a store call fails.
    #[instrument(skip(self, user, product_id), fields(user_id = %user, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user: &UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, ServiceError> {
        let existing: Vec<CartItem> = query_records(
            self.store,
            Collection::Cart,
            &line_filters(user, product_id),
        )
        .await?;

        if let Some(mut item) = existing.into_iter().next() {
            item.quantity = quantity;
            upsert_record(self.store, Collection::Cart, &item).await?;
            debug!(cart_item_id = %item.id, "updated cart line quantity");
            return Ok(item);
        }

        let item = CartItem::new(user.clone(), product_id.clone(), quantity);
        create_record(self.store, Collection::Cart, &item).await?;
        debug!(cart_item_id = %item.id, "created cart line");
        Ok(item)
    }

    /// Remove every line for `product_id` from the cart.
    ///
    /// Returns how many lines were deleted; removing a product that is not in
    /// the cart is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if a store call fails.
    #[instrument(skip(self, user, product_id), fields(user_id = %user, product_id = %product_id))]
    pub async fn remove_item(
        &self,
        user: &UserId,
        product_id: &ProductId,
    ) -> Result<usize, ServiceError> {
        let lines: Vec<CartItem> = query_records(
            self.store,
            Collection::Cart,
            &line_filters(user, product_id),
        )
        .await?;

        let mut removed = 0;
        for line in &lines {
            if self
                .store
                .delete_by_id(Collection::Cart, line.id.as_str(), user.as_str())
                .await?
            {
                removed += 1;
            }
        }

        debug!(removed, "removed cart lines");
        Ok(removed)
    }
}

fn line_filters(user: &UserId, product_id: &ProductId) -> [Filter; 2] {
    [
        Filter::eq("user_id", user.as_str()),
        Filter::eq("product_id", product_id.as_str()),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let store = MemoryDocumentStore::new();
        let cart = CartService::new(&store)
            .get_cart(&UserId::new("demo_user"))
            .await
            .unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_new_product_creates_one_line() {
        let store = MemoryDocumentStore::new();
        let cart = CartService::new(&store);
        let user = UserId::new("demo_user");

        let item = cart.add_item(&user, &ProductId::new("1"), qty(2)).await.unwrap();

        let lines = cart.get_cart(&user).await.unwrap();
        assert_eq!(lines, vec![item.clone()]);
        assert_eq!(item.quantity, qty(2));
        assert_eq!(item.user_id, user);
    }

    #[tokio::test]
    async fn test_add_existing_product_replaces_quantity() {
        let store = MemoryDocumentStore::new();
        let cart = CartService::new(&store);
        let user = UserId::new("demo_user");
        let product = ProductId::new("1");

        let first = cart.add_item(&user, &product, qty(2)).await.unwrap();
        let second = cart.add_item(&user, &product, qty(5)).await.unwrap();

        assert_eq!(first.id, second.id);
        let lines = cart.get_cart(&user).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, qty(5));
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let store = MemoryDocumentStore::new();
        let cart = CartService::new(&store);
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        cart.add_item(&alice, &ProductId::new("1"), qty(1)).await.unwrap();
        cart.add_item(&bob, &ProductId::new("1"), qty(3)).await.unwrap();

        assert_eq!(cart.get_cart(&alice).await.unwrap()[0].quantity, qty(1));
        assert_eq!(cart.get_cart(&bob).await.unwrap()[0].quantity, qty(3));
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let store = MemoryDocumentStore::new();
        let cart = CartService::new(&store);
        let user = UserId::new("demo_user");

        assert_eq!(
            cart.remove_item(&user, &ProductId::new("1")).await.unwrap(),
            0
        );

        cart.add_item(&user, &ProductId::new("1"), qty(1)).await.unwrap();
        cart.add_item(&user, &ProductId::new("2"), qty(1)).await.unwrap();

        assert_eq!(
            cart.remove_item(&user, &ProductId::new("1")).await.unwrap(),
            1
        );
        assert_eq!(
            cart.remove_item(&user, &ProductId::new("1")).await.unwrap(),
            0
        );

        let remaining = cart.get_cart(&user).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].product_id, ProductId::new("2"));
    }

    #[tokio::test]
    async fn test_remove_clears_duplicate_lines() {
        let store = MemoryDocumentStore::new();
        let user = UserId::new("demo_user");
        let product = ProductId::new("1");

        // Two lines for one product, as left behind by racing adds.
        for _ in 0..2 {
            let line = CartItem::new(user.clone(), product.clone(), qty(1));
            create_record(&store, Collection::Cart, &line).await.unwrap();
        }

        let cart = CartService::new(&store);
        assert_eq!(cart.remove_item(&user, &product).await.unwrap(), 2);
        assert!(cart.get_cart(&user).await.unwrap().is_empty());
    }
}
