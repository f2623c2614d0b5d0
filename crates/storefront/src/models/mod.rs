//! Domain models for the storefront.
//!
//! A [`UserDocument`] is the root aggregate: the cart, the address slots and
//! the order history are all embedded in it. [`Product`] is read-only catalog
//! data that gets copied into cart items and orders.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use address::{Address, AddressInput};
pub use cart::{CartItem, CartSummary};
pub use order::Order;
pub use product::Product;
pub use user::UserDocument;
