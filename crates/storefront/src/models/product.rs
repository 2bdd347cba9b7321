//! Product domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use huerto_core::{Price, ProductId};

/// Stock given to a product when none is specified.
pub const DEFAULT_STOCK: i64 = 100;
/// Category given to a product when none is specified.
pub const DEFAULT_CATEGORY: &str = "Frutas y Verduras";
/// Origin given to a product when none is specified.
pub const DEFAULT_ORIGIN: &str = "Local";
/// Highest accepted product price, in pesos.
pub const MAX_PRICE_CLP: i64 = 1_000_000_000;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned id, [`ProductId::UNASSIGNED`] before the first save.
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub stock: i64,
    pub category: String,
    pub origin: String,
    /// Image reference: a URL or a device URI. May be empty.
    pub image_url: String,
}

impl Product {
    /// A product that has not been saved yet, with the default stock,
    /// category and origin.
    #[must_use]
    pub fn draft(name: impl Into<String>, price: Price) -> Self {
        Self {
            id: ProductId::UNASSIGNED,
            name: name.into(),
            description: String::new(),
            price,
            stock: DEFAULT_STOCK,
            category: DEFAULT_CATEGORY.to_owned(),
            origin: DEFAULT_ORIGIN.to_owned(),
            image_url: String::new(),
        }
    }

    /// Price formatted for display, e.g. `$1.500`.
    #[must_use]
    pub fn display_price(&self) -> String {
        self.price.to_string()
    }
}

/// Product fields submitted from the admin editor.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Reasons a product edit is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductInputError {
    #[error("product name is required")]
    MissingName,
    #[error("price cannot be negative")]
    NegativePrice,
    #[error("price cannot exceed {max}")]
    PriceTooHigh { max: i64 },
    #[error("stock cannot be negative")]
    NegativeStock,
}

impl ProductInput {
    /// Validate the input and build the product to save under `id`.
    ///
    /// Missing optional fields take the catalog defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProductInputError`] for a blank name, a negative stock, or a
    /// price below zero or above [`MAX_PRICE_CLP`].
    pub fn into_product(self, id: ProductId) -> Result<Product, ProductInputError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductInputError::MissingName);
        }

        let price = Price::clp(self.price);
        if price.is_negative() {
            return Err(ProductInputError::NegativePrice);
        }
        if self.price > Decimal::from(MAX_PRICE_CLP) {
            return Err(ProductInputError::PriceTooHigh { max: MAX_PRICE_CLP });
        }

        let stock = self.stock.unwrap_or(DEFAULT_STOCK);
        if stock < 0 {
            return Err(ProductInputError::NegativeStock);
        }

        Ok(Product {
            id,
            name: name.to_owned(),
            description: self.description.unwrap_or_default(),
            price,
            stock,
            category: non_blank_or(self.category, DEFAULT_CATEGORY),
            origin: non_blank_or(self.origin, DEFAULT_ORIGIN),
            image_url: self.image_url.unwrap_or_default(),
        })
    }
}

fn non_blank_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(name: &str, price: i64) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            description: None,
            price: Decimal::from(price),
            stock: None,
            category: None,
            origin: None,
            image_url: None,
        }
    }

    #[test]
    fn test_into_product_applies_defaults() {
        let product = input("  Zanahoria ", 700)
            .into_product(ProductId::UNASSIGNED)
            .unwrap();
        assert_eq!(product.name, "Zanahoria");
        assert_eq!(product.stock, DEFAULT_STOCK);
        assert_eq!(product.category, DEFAULT_CATEGORY);
        assert_eq!(product.origin, DEFAULT_ORIGIN);
        assert_eq!(product.display_price(), "$700");
    }

    #[test]
    fn test_into_product_rejects_bad_input() {
        assert_eq!(
            input(" ", 10).into_product(ProductId::UNASSIGNED),
            Err(ProductInputError::MissingName)
        );
        assert_eq!(
            input("Tomate", -1).into_product(ProductId::UNASSIGNED),
            Err(ProductInputError::NegativePrice)
        );

        let mut negative_stock = input("Tomate", 10);
        negative_stock.stock = Some(-5);
        assert_eq!(
            negative_stock.into_product(ProductId::UNASSIGNED),
            Err(ProductInputError::NegativeStock)
        );
    }

    #[test]
    fn test_into_product_caps_price() {
        let product = input("Trufa", MAX_PRICE_CLP)
            .into_product(ProductId::UNASSIGNED)
            .unwrap();
        assert_eq!(product.price.amount, Decimal::from(MAX_PRICE_CLP));

        let mut huge = input("Trufa", 0);
        huge.price = Decimal::MAX;
        assert_eq!(
            huge.into_product(ProductId::UNASSIGNED),
            Err(ProductInputError::PriceTooHigh { max: MAX_PRICE_CLP })
        );
        assert_eq!(
            input("Trufa", MAX_PRICE_CLP + 1).into_product(ProductId::UNASSIGNED),
            Err(ProductInputError::PriceTooHigh { max: MAX_PRICE_CLP })
        );
    }

    #[test]
    fn test_input_accepts_price_as_string_or_number() {
        let parsed: ProductInput =
            serde_json::from_str(r#"{"name": "Plátano", "price": "990", "stock": 150}"#).unwrap();
        let product = parsed.into_product(ProductId::new(2)).unwrap();
        assert_eq!(product.id, ProductId::new(2));
        assert_eq!(product.stock, 150);

        let parsed: ProductInput =
            serde_json::from_str(r#"{"name": "Manzana Fuji", "price": 1500}"#).unwrap();
        assert_eq!(parsed.price, Decimal::from(1500));
    }
}
