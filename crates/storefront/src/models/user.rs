//! User document (root aggregate).

use serde::{Deserialize, Serialize};

use cartline_core::UserId;

use super::{Address, CartItem, Order};

/// A user document with its embedded cart, address slots and order history.
///
/// `version` increases on every write to the document and serves as the
/// optimistic concurrency token for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub cart: Vec<CartItem>,
    #[serde(default)]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub version: i64,
}

impl UserDocument {
    /// A new user with nothing in the cart, no addresses and no orders.
    #[must_use]
    pub const fn new(id: UserId) -> Self {
        Self {
            id,
            cart: Vec::new(),
            addresses: Vec::new(),
            orders: Vec::new(),
            version: 0,
        }
    }
}
