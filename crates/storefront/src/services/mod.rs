//! Business logic services for the storefront.
//!
//! # Services
//!
//! - [`CartService`] - Add, remove and list cart items
//! - [`AddressService`] - Two fixed address slots (home, work)
//! - [`CheckoutService`] - Turn a cart, or a single product, into an order
//!
//! Each service is constructed with the shared [`DocumentStore`] handle; none
//! of them keep state of their own.
//!
//! [`DocumentStore`]: crate::db::DocumentStore

pub mod address;
pub mod cart;
pub mod checkout;
pub mod clock;
mod error;

pub use address::AddressService;
pub use cart::CartService;
pub use checkout::{CheckoutService, CheckoutStage};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ServiceError;

use serde::Serialize;
use serde_json::Value;

use crate::db::RepositoryError;

/// Serialize a model into the value stored in a user document array.
fn to_document<T: Serialize>(model: &T) -> Result<Value, ServiceError> {
    serde_json::to_value(model)
        .map_err(|e| ServiceError::Store(RepositoryError::DataCorruption(e.to_string())))
}
