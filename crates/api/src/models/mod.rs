//! Domain records persisted in the document store.
//!
//! Each record serializes to exactly the JSON document stored in its
//! collection, so the HTTP layer returns them as-is.

pub mod cart;
pub mod order;
pub mod product;

pub use cart::CartItem;
pub use order::{Order, OrderLine};
pub use product::Product;
