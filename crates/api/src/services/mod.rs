//! Business logic services.
//!
//! # Services
//!
//! - `catalog` - Product listing, lookup and categories (read-only)
//! - `cart` - Per-user cart lines (add / overwrite / remove)
//! - `orders` - Checkout (cart → order) and order history
//!
//! Services borrow the injected [`DocumentStore`](crate::store::DocumentStore)
//! for the duration of one request and hold no state of their own.

mod cart;
mod catalog;
mod error;
mod orders;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use error::ServiceError;
pub use orders::OrderService;
