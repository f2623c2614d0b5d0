//! Cart operations.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use cartline_core::{Price, ProductId, UserId};

use super::{ServiceError, to_document};
use crate::db::{ArrayField, DocumentStore, RepositoryError};
use crate::models::{CartItem, CartSummary};

/// Field summed to compute a cart total.
const PRICE_FIELD: &str = "price";

/// Reads of a cart before giving up on getting a total that matches its items.
const CART_READ_ATTEMPTS: u32 = 3;

/// Cart service.
///
/// Items are denormalized copies of catalog products, so a later catalog
/// change never alters what is already in a cart.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn DocumentStore>,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Copy a catalog product into the user's cart.
    ///
    /// Adding the same product twice yields two lines.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the product or user does not exist.
    /// The product is looked up before the user document is touched.
    #[instrument(skip(self), fields(%user_id, %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartItem, ServiceError> {
        let product = self
            .store
            .get_product(product_id)
            .await?
            .ok_or(ServiceError::NotFound("product"))?;

        let item = CartItem::from(&product);
        self.store
            .append_to_array(user_id, ArrayField::Cart, to_document(&item)?, None)
            .await
            .map_err(ServiceError::user_scoped)?;

        tracing::info!(price = %item.price, "Added item to cart");
        Ok(item)
    }

    /// Remove every cart line whose ID is `item_id`.
    ///
    /// Returns how many lines were removed; zero is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    #[instrument(skip(self), fields(%user_id, %item_id))]
    pub async fn remove_item(
        &self,
        user_id: UserId,
        item_id: ProductId,
    ) -> Result<usize, ServiceError> {
        let removed = self
            .store
            .remove_matching_from_array(
                user_id,
                ArrayField::Cart,
                "_id",
                Value::String(item_id.to_string()),
            )
            .await
            .map_err(ServiceError::user_scoped)?;

        tracing::info!(removed, "Removed item from cart");
        Ok(removed)
    }

    /// Cart contents and the store-computed total. An empty cart totals zero.
    ///
    /// The total is summed at the version the items were read at; if the
    /// cart changes in between, the cart is read again.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the user does not exist.
    /// Returns `ServiceError::Store` with `RepositoryError::Conflict` if the
    /// cart kept changing for every attempt.
    #[instrument(skip(self), fields(%user_id))]
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartSummary, ServiceError> {
        let mut attempt = 1;
        loop {
            let user = self
                .store
                .get_user(user_id)
                .await?
                .ok_or(ServiceError::NotFound("user"))?;

            match self
                .store
                .sum_field(user_id, ArrayField::Cart, PRICE_FIELD, Some(user.version))
                .await
            {
                Ok(total) => {
                    return Ok(CartSummary {
                        total: Price::new(total),
                        items: user.cart,
                    });
                }
                Err(RepositoryError::Conflict(reason)) if attempt < CART_READ_ATTEMPTS => {
                    tracing::debug!(attempt, %reason, "Cart changed while totalling, reading again");
                    attempt += 1;
                }
                Err(e) => return Err(ServiceError::user_scoped(e)),
            }
        }
    }
}
