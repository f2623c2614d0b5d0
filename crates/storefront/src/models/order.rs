//! Placed orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cartline_core::{OrderId, PaymentMethod, Price};

use super::CartItem;

/// An immutable record of a purchase.
///
/// `items` and `total` are frozen copies taken when the order was placed; the
/// cart they came from may be emptied or edited without affecting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(rename = "order_list")]
    pub items: Vec<CartItem>,
    #[serde(rename = "ordered_on")]
    pub ordered_at: DateTime<Utc>,
    #[serde(rename = "total_price")]
    pub total: Price,
    pub payment_method: PaymentMethod,
}

impl Order {
    /// Build a cash-on-delivery order from a snapshot of items and its total.
    #[must_use]
    pub fn cash_on_delivery(items: Vec<CartItem>, total: Price, ordered_at: DateTime<Utc>) -> Self {
        Self {
            id: OrderId::generate(),
            items,
            ordered_at,
            total,
            payment_method: PaymentMethod::cash_on_delivery(),
        }
    }
}
