//! Core types for Cartline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod payment;
pub mod price;
pub mod slot;

pub use id::*;
pub use payment::PaymentMethod;
pub use price::Price;
pub use slot::AddressSlot;
