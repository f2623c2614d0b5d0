//! Catalog product.

use serde::{Deserialize, Serialize};

use cartline_core::{Price, ProductId};

/// A catalog product as stored in the `products` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    #[serde(rename = "product_name")]
    pub name: String,
    /// Current catalog price.
    pub price: Price,
    /// Rating shown next to the product.
    pub rating: u8,
    /// Image reference (URL or asset key).
    pub image: String,
}
