//! Cartline Core - Shared types library.
//!
//! This crate provides common types used across all Cartline components:
//! - `storefront` - Cart, address and checkout HTTP service
//! - `cli` - Command-line tools for migrations, seeding and user setup
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, payment flags and address slots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
