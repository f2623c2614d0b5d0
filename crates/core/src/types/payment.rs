//! Payment method flags recorded on orders.

use serde::{Deserialize, Serialize};

/// How an order is paid for.
///
/// Only cash on delivery is supported at checkout; `digital` is carried so the
/// stored record keeps both flags explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Paid online.
    pub digital: bool,
    /// Cash on delivery.
    pub cod: bool,
}

impl PaymentMethod {
    /// Cash on delivery, the method every checkout records.
    #[must_use]
    pub const fn cash_on_delivery() -> Self {
        Self {
            digital: false,
            cod: true,
        }
    }
}
