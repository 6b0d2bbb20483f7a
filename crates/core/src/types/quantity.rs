//! Cart line quantity type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The quantity is zero or negative.
    #[error("quantity must be at least {min} (got {got})")]
    TooSmall {
        /// Minimum allowed quantity.
        min: u32,
        /// Value that was supplied.
        got: i64,
    },
    /// The quantity exceeds the per-line maximum.
    #[error("quantity must be at most {max} (got {got})")]
    TooLarge {
        /// Maximum allowed quantity.
        max: u32,
        /// Value that was supplied.
        got: i64,
    },
}

/// A positive line-item quantity.
///
/// ## Constraints
///
/// - Range: 1-999 inclusive
///
/// ## Examples
///
/// ```
/// use cloudmart_core::Quantity;
///
/// assert!(Quantity::new(2).is_ok());
/// assert!(Quantity::new(0).is_err());
/// assert!(Quantity::new(-3).is_err());
/// assert!(Quantity::new(1000).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest quantity a cart line may hold.
    pub const MIN: u32 = 1;
    /// Largest quantity a cart line may hold.
    pub const MAX: u32 = 999;
    /// A quantity of one.
    pub const ONE: Self = Self(1);

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] if `value` is outside `1..=999`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < i64::from(Self::MIN) {
            return Err(QuantityError::TooSmall {
                min: Self::MIN,
                got: value,
            });
        }
        if value > i64::from(Self::MAX) {
            return Err(QuantityError::TooLarge {
                max: Self::MAX,
                got: value,
            });
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::TooLarge {
                max: Self::MAX,
                got: value,
            })
    }

    /// The quantity as a `u32`.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}
