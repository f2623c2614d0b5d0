//! Checkout: turning a cart, or a single product, into an order.
//!
//! An order is built completely in process (items, total, timestamp) and then
//! written with one store call. For a cart checkout that same write clears
//! the cart, guarded by the user document's `version`: if anything touched
//! the document after it was loaded, the write is refused with
//! [`RepositoryError::Conflict`] and nothing changes. A failed checkout
//! therefore never leaves an order behind.
//!
//! ```text
//! Loaded -> Priced -> Built -> Committed -> Complete
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::instrument;

use cartline_core::{Price, ProductId, UserId};

use super::{Clock, ServiceError, to_document};
use crate::db::{ArrayField, DocumentStore, RepositoryError};
use crate::models::{CartItem, Order};

/// Progress of a single checkout attempt, recorded in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    /// User document read; its version is the concurrency token.
    Loaded,
    /// Cart total computed by the store.
    Priced,
    /// Order value constructed.
    Built,
    /// Order appended and cart cleared in one write.
    Committed,
    Complete,
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Loaded => "loaded",
            Self::Priced => "priced",
            Self::Built => "built",
            Self::Committed => "committed",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Checkout service.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl CheckoutService {
    /// Create a new checkout service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Place a cash-on-delivery order for the whole cart and empty the cart.
    ///
    /// The order's items are a snapshot of the cart and its total is the
    /// store-computed sum of their prices. An empty cart yields an order with
    /// no items and a zero total.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    /// Returns `ServiceError::Store` with `RepositoryError::Conflict` if the
    /// user document changed during checkout; nothing is written then.
    #[instrument(skip(self), fields(%user_id, order_id = tracing::field::Empty))]
    pub async fn checkout_cart(&self, user_id: UserId) -> Result<Order, ServiceError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;
        stage(CheckoutStage::Loaded);

        let total = self
            .store
            .sum_field(user_id, ArrayField::Cart, "price", Some(user.version))
            .await
            .map_err(ServiceError::user_scoped)?;
        stage(CheckoutStage::Priced);

        let order = Order::cash_on_delivery(user.cart, Price::new(total), self.clock.now());
        tracing::Span::current().record("order_id", tracing::field::display(order.id));
        stage(CheckoutStage::Built);

        self.store
            .append_order(user_id, to_document(&order)?, Some(user.version))
            .await
            .map_err(|e| {
                if let RepositoryError::Conflict(_) = e {
                    tracing::warn!(version = user.version, "Cart changed during checkout");
                }
                ServiceError::user_scoped(e)
            })?;
        stage(CheckoutStage::Committed);

        tracing::info!(
            total = %order.total,
            items = order.items.len(),
            "Placed order from cart"
        );
        stage(CheckoutStage::Complete);
        Ok(order)
    }

    /// Place a cash-on-delivery order for one product, bypassing the cart.
    ///
    /// The product is read fresh from the catalog; the cart is not touched.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product does not exist (before
    /// any write) or if the user does not exist.
    #[instrument(skip(self), fields(%user_id, %product_id, order_id = tracing::field::Empty))]
    pub async fn instant_buy(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Order, ServiceError> {
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;

        let order = Order::cash_on_delivery(
            vec![CartItem::from(&product)],
            product.price,
            self.clock.now(),
        );
        tracing::Span::current().record("order_id", tracing::field::display(order.id));

        self.store
            .append_order(user_id, to_document(&order)?, None)
            .await
            .map_err(ServiceError::user_scoped)?;

        tracing::info!(total = %order.total, "Placed instant order");
        Ok(order)
    }
}

fn stage(stage: CheckoutStage) {
    tracing::debug!(%stage, "Checkout stage");
}
