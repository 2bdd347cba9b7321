//! Cart domain types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use huerto_core::{Price, ProductId, UserId};

use super::Product;

/// One cart row: a quantity of a product held by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CartItem {
    #[must_use]
    pub const fn new(user_id: UserId, product_id: ProductId, quantity: i64) -> Self {
        Self {
            user_id,
            product_id,
            quantity,
        }
    }
}

/// A cart row joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    pub line_total: Price,
}

/// A line or cart total too large to represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cart total is too large")]
pub struct CartOverflow;

impl CartLine {
    /// # Errors
    ///
    /// Returns [`CartOverflow`] if price times quantity overflows.
    pub fn new(product: Product, quantity: i64) -> Result<Self, CartOverflow> {
        let line_total = product.price.checked_times(quantity).ok_or(CartOverflow)?;
        Ok(Self {
            product,
            quantity,
            line_total,
        })
    }
}

/// Cart contents with totals, as shown on the cart screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub total: Price,
    /// `total` formatted for display, e.g. `$4.500`.
    pub total_display: String,
    /// Sum of quantities (the badge count).
    pub item_count: i64,
}

impl CartSummary {
    /// Summarize cart items against the known products.
    ///
    /// Items whose product no longer exists are left out of the lines and
    /// the total and the count, but lines keep the order of `products`.
    ///
    /// # Errors
    ///
    /// Returns [`CartOverflow`] if a line total, the cart total or the unit
    /// count overflows.
    pub fn from_items(items: &[CartItem], products: &[Product]) -> Result<Self, CartOverflow> {
        let lines = products
            .iter()
            .filter_map(|product| {
                items
                    .iter()
                    .find(|item| item.product_id == product.id)
                    .map(|item| CartLine::new(product.clone(), item.quantity))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let total = lines
            .iter()
            .try_fold(Price::zero(), |acc, line| acc.checked_add(&line.line_total))
            .ok_or(CartOverflow)?;
        let item_count = lines
            .iter()
            .try_fold(0_i64, |acc, line| acc.checked_add(line.quantity))
            .ok_or(CartOverflow)?;

        Ok(Self {
            total_display: total.to_string(),
            lines,
            total,
            item_count,
        })
    }

    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        let total = Price::zero();
        Self {
            lines: Vec::new(),
            total,
            total_display: total.to_string(),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
