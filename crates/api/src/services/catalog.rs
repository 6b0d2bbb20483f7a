//! Catalog service.

use std::collections::BTreeSet;

use cloudmart_core::ProductId;
use tracing::instrument;

use super::ServiceError;
use crate::models::Product;
use crate::store::{Collection, DocumentStore, Filter, query_records};

/// Read-only access to the product catalog.
pub struct CatalogService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// List all products, or only those in `category`.
    ///
    /// The category must match exactly (case-sensitive). A blank category is
    /// treated as no filter; an unknown one yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store query fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, category: Option<&str>) -> Result<Vec<Product>, ServiceError> {
        let filters: Vec<Filter> = category
            .filter(|c| !c.is_empty())
            .map(|c| vec![Filter::eq("category", c)])
            .unwrap_or_default();

        Ok(query_records(self.store, Collection::Products, &filters).await?)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no product has this ID.
    /// Returns `ServiceError::Store` if the store query fails.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        let products: Vec<Product> = query_records(
            self.store,
            Collection::Products,
            &[Filter::eq("id", id.as_str())],
        )
        .await?;

        products
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))
    }

    /// Distinct categories across all products, sorted.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Store` if the store query fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<BTreeSet<String>, ServiceError> {
        let products = self.list_products(None).await?;
        Ok(products.into_iter().map(|p| p.category).collect())
    }
}
