//! Cart line items.

use serde::{Deserialize, Serialize};

use cartline_core::{Price, ProductId};

use super::Product;

/// A line in a user's cart, denormalized from the catalog when added.
///
/// The identity is the product's ID, so adding the same product twice yields
/// two lines with the same ID. Later catalog edits never touch existing lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(rename = "product_name")]
    pub name: String,
    pub price: Price,
    pub rating: u8,
    pub image: String,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            rating: product.rating,
            image: product.image.clone(),
        }
    }
}

/// Cart contents plus the store-computed total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub total: Price,
    pub items: Vec<CartItem>,
}

impl CartSummary {
    /// An empty cart with a zero total.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total: Price::ZERO,
            items: Vec::new(),
        }
    }
}
