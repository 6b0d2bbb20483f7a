//! Demo catalog seeding.
//!
//! The catalog is read-only over HTTP, so a fresh store is filled with a fixed
//! set of demo products either at API startup (`CLOUDMART_SEED_ON_STARTUP`) or
//! with `cloudmart-cli seed`.

use cloudmart_core::{Price, ProductId};
use tracing::{info, instrument};

use crate::models::Product;
use crate::store::{Collection, DocumentStore, StoreError, create_record};

/// How to treat products that are already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedMode {
    /// Only seed when the catalog has no products at all.
    #[default]
    IfEmpty,
    /// Insert every demo product whose id is not taken yet.
    MissingOnly,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    /// Products written.
    pub inserted: usize,
    /// Products left alone because they (or a catalog) already existed.
    pub skipped: usize,
}

/// The demo catalog.
#[must_use]
pub fn demo_products() -> Vec<Product> {
    [
        ("1", "Wireless Headphones Pro", "Electronics", 19_999, 50, "🎧",
            "Premium noise-cancelling wireless headphones with 30hr battery"),
        ("2", "Smart Watch Elite", "Electronics", 29_999, 30, "⌚",
            "Advanced fitness tracking smartwatch with GPS"),
        ("3", "Running Shoes X1", "Sports", 8_999, 100, "👟",
            "Lightweight breathable running shoes"),
        ("4", "Laptop Backpack Pro", "Accessories", 4_999, 75, "🎒",
            "Water-resistant 15.6 inch laptop backpack"),
        ("5", "Coffee Maker Deluxe", "Home", 7_999, 40, "☕",
            "12-cup programmable coffee maker"),
        ("6", "Yoga Mat Premium", "Sports", 3_599, 60, "🧘",
            "Extra thick eco-friendly yoga mat"),
        ("7", "Bluetooth Speaker", "Electronics", 5_999, 45, "🔊",
            "Portable waterproof bluetooth speaker"),
        ("8", "Desk Lamp LED", "Home", 2_999, 80, "💡",
            "Adjustable LED desk lamp with USB port"),
    ]
    .into_iter()
    .map(|(id, name, category, cents, stock, image, description)| Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        price: Price::from_cents(cents),
        description: Some(description.to_string()),
        stock: Some(stock),
        image: Some(image.to_string()),
    })
    .collect()
}

/// Write the demo catalog into `store`.
///
/// Products that already exist are counted as skipped, never overwritten.
///
/// # Errors
///
/// Returns the first store error other than an id conflict.
#[instrument(skip(store), fields(backend = store.backend()))]
pub async fn seed_products(
    store: &dyn DocumentStore,
    mode: SeedMode,
) -> Result<SeedReport, StoreError> {
    let products = demo_products();
    let mut report = SeedReport::default();

    if mode == SeedMode::IfEmpty && !store.query(Collection::Products, &[]).await?.is_empty() {
        report.skipped = products.len();
        info!("catalog already populated, skipping seed");
        return Ok(report);
    }

    for product in &products {
        match create_record(store, Collection::Products, product).await {
            Ok(()) => report.inserted += 1,
            Err(StoreError::Conflict { .. }) => report.skipped += 1,
            Err(e) => return Err(e),
        }
    }

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "seeded demo catalog"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::store::MemoryDocumentStore;

    #[test]
    fn test_demo_products_are_unique_and_complete() {
        let products = demo_products();
        assert_eq!(products.len(), 8);

        let ids: HashSet<_> = products.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), products.len());
        assert!(products.iter().all(|p| p.description.is_some() && p.image.is_some()));
        assert_eq!(products[0].price, Price::from_cents(19_999));
    }

    #[tokio::test]
    async fn test_seed_twice_inserts_once() {
        let store = MemoryDocumentStore::new();

        let first = seed_products(&store, SeedMode::IfEmpty).await.unwrap();
        assert_eq!(first, SeedReport { inserted: 8, skipped: 0 });

        let second = seed_products(&store, SeedMode::IfEmpty).await.unwrap();
        assert_eq!(second, SeedReport { inserted: 0, skipped: 8 });
        assert_eq!(store.len(Collection::Products).await, 8);
    }

    #[tokio::test]
    async fn test_missing_only_fills_gaps() {
        let store = MemoryDocumentStore::new();
        let first = demo_products().into_iter().next().unwrap();
        create_record(&store, Collection::Products, &first).await.unwrap();

        let skipped = seed_products(&store, SeedMode::IfEmpty).await.unwrap();
        assert_eq!(skipped.inserted, 0);

        let report = seed_products(&store, SeedMode::MissingOnly).await.unwrap();
        assert_eq!(report, SeedReport { inserted: 7, skipped: 1 });
        assert_eq!(store.len(Collection::Products).await, 8);
    }
}
