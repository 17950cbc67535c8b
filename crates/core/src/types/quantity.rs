//! Order quantity.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when choosing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative quantities are never orderable.
    #[error("quantity must be at least 1")]
    Zero,
    /// More units requested than the product has in stock.
    #[error("only {available} items available")]
    ExceedsStock {
        /// Units currently in stock.
        available: u32,
    },
}

/// A positive number of units.
///
/// Stock bounds are checked by [`Quantity::within_stock`] at the point where
/// the shopper picks a quantity; the checkout flow trusts what it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] for `0`.
    pub fn new(units: u32) -> Result<Self, QuantityError> {
        NonZeroU32::new(units).map(Self).ok_or(QuantityError::Zero)
    }

    /// Create a quantity bounded by the units in stock.
    ///
    /// # Errors
    ///
    /// Returns an error if `units` is zero or greater than `available`.
    pub fn within_stock(units: u32, available: u32) -> Result<Self, QuantityError> {
        let quantity = Self::new(units)?;
        if units > available {
            return Err(QuantityError::ExceedsStock { available });
        }
        Ok(quantity)
    }

    /// Number of units.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_rejected() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
    }

    #[test]
    fn test_within_stock_bounds() {
        assert_eq!(Quantity::within_stock(5, 5).map(Quantity::get), Ok(5));
        assert_eq!(
            Quantity::within_stock(6, 5),
            Err(QuantityError::ExceedsStock { available: 5 })
        );
        assert_eq!(Quantity::within_stock(1, 0), Err(QuantityError::ExceedsStock { available: 0 }));
    }

    #[test]
    fn test_serializes_as_number() {
        let q = Quantity::new(3).map(|q| serde_json::to_string(&q).ok());
        assert_eq!(q, Ok(Some("3".to_string())));
    }
}
