//! Catalog product type.
//!
//! Products are owned by the admin back-office; the storefront only reads
//! them. Orders copy the fields they need into [`crate::order::LineItem`]s
//! at purchase time, so later edits or deletions never touch past orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Badge, ColorSpec, Money, ProductId};

/// A catalog product, with colors and badges already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Merchandising category, e.g. "shirts" or "dresses".
    pub category: String,
    /// List price in major units.
    pub price: Money,
    /// Percentage discount currently applied, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<u8>,
    /// Image URLs, primary first. Hosted externally; never uploaded here.
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<ColorSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<Badge>,
    /// Free-form specification key/value pairs (fabric, fit, care).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub specifications: serde_json::Map<String, serde_json::Value>,
    pub in_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Effective selling price after the current discount.
    #[must_use]
    pub fn effective_price(&self) -> Money {
        match self.discount_percent {
            Some(pct) if pct > 0 && pct <= 100 => {
                let discount = Money::from_minor_units(
                    self.price.to_minor_units() * i64::from(pct) / 100,
                );
                self.price - discount
            }
            _ => self.price,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(price: &str, discount: Option<u8>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Twill Jacket".into(),
            description: "Heavy cotton twill".into(),
            category: "jackets".into(),
            price: Money::new(price.parse().unwrap()),
            discount_percent: discount,
            images: vec!["https://img.example.com/jacket.jpg".into()],
            sizes: vec!["S".into(), "M".into(), "L".into()],
            colors: vec![],
            badges: vec![],
            specifications: serde_json::Map::new(),
            in_stock: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_without_discount() {
        assert_eq!(product("80.00", None).effective_price(), Money::from_minor_units(8000));
    }

    #[test]
    fn test_effective_price_with_discount() {
        // 25% off 80.00 -> 60.00
        assert_eq!(
            product("80.00", Some(25)).effective_price(),
            Money::from_minor_units(6000)
        );
    }

    #[test]
    fn test_effective_price_ignores_invalid_discount() {
        assert_eq!(
            product("80.00", Some(101)).effective_price(),
            Money::from_minor_units(8000)
        );
    }
}
