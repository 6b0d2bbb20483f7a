//! Catalog product record.

use cloudmart_core::{Price, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// Products are written once by the seeder and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category, matched exactly by the catalog filter.
    pub category: String,
    /// Unit price.
    pub price: Price,
    /// Marketing description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Units on hand. Informational only; orders never decrement it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    /// Image reference (URL or emoji glyph).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let product = Product {
            id: ProductId::new("9"),
            name: "Plain Mug".to_string(),
            category: "Home".to_string(),
            price: Price::from_cents(1_250),
            description: None,
            stock: None,
            image: None,
        };

        assert_eq!(
            serde_json::to_value(&product).unwrap(),
            json!({"id": "9", "name": "Plain Mug", "category": "Home", "price": 12.5})
        );
    }

    #[test]
    fn test_deserializes_stored_document() {
        let product: Product = serde_json::from_value(json!({
            "id": "3",
            "name": "Running Shoes X1",
            "category": "Sports",
            "price": 89.99,
            "stock": 100,
            "image": "👟"
        }))
        .unwrap();

        assert_eq!(product.price, Price::from_cents(8_999));
        assert_eq!(product.stock, Some(100));
        assert!(product.description.is_none());
    }
}
