//! Service error types.

use cloudmart_core::QuantityError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur in catalog, cart and order operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Requested record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Input was rejected before touching the store.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Document store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<QuantityError> for ServiceError {
    fn from(err: QuantityError) -> Self {
        Self::Validation(err.to_string())
    }
}
