//! Document store for user and product documents.
//!
//! # Collections
//!
//! - `users` - One document per user with three embedded arrays:
//!   `cart`, `addresses` and `orders`, plus a `version` counter
//! - `products` - Read-only catalog
//!
//! The store is reached through the [`DocumentStore`] trait and shared as
//! `Arc<dyn DocumentStore>`. Two implementations exist:
//!
//! - [`PgDocumentStore`] - `PostgreSQL` with JSONB columns
//! - [`MemoryDocumentStore`] - in-process maps, for development and tests
//!
//! [`TimeoutStore`] wraps either one so every call is bounded in time.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cartline-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;
pub mod timeout;

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use cartline_core::{ProductId, UserId};

use crate::models::{Product, UserDocument};

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
pub use timeout::TimeoutStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document or array element was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation or a concurrent write won the race.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store did not answer within the configured timeout.
    #[error("store operation timed out")]
    Timeout,
}

/// An embedded array of the user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayField {
    Cart,
    Addresses,
    Orders,
}

impl ArrayField {
    /// Field name in the stored document (also the column name in `PostgreSQL`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Addresses => "addresses",
            Self::Orders => "orders",
        }
    }
}

impl std::fmt::Display for ArrayField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a bounded append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The value was appended.
    Appended,
    /// The array was already at its maximum length; nothing was written.
    Full,
}

/// Persistence operations the cart, address and checkout services rely on.
///
/// Every mutating call on a missing user returns [`RepositoryError::NotFound`]
/// and bumps the user's `version` when it changes the document. Each call is
/// atomic with respect to the single user document it touches.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Fetch a user document.
    async fn get_user(&self, id: UserId) -> Result<Option<UserDocument>, RepositoryError>;

    /// Fetch a catalog product.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert a new user document.
    ///
    /// Returns [`RepositoryError::Conflict`] if the ID is already taken.
    async fn insert_user(&self, user: &UserDocument) -> Result<(), RepositoryError>;

    /// Insert a new catalog product.
    ///
    /// Returns [`RepositoryError::Conflict`] if the ID is already taken.
    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Append `value` to the end of `field`.
    ///
    /// With `max_len`, the length check and the append happen in the same
    /// write; a full array yields [`AppendOutcome::Full`] without mutation.
    async fn append_to_array(
        &self,
        user: UserId,
        field: ArrayField,
        value: Value,
        max_len: Option<usize>,
    ) -> Result<AppendOutcome, RepositoryError>;

    /// Replace the whole of `field` with `values`.
    async fn overwrite_array(
        &self,
        user: UserId,
        field: ArrayField,
        values: Vec<Value>,
    ) -> Result<(), RepositoryError>;

    /// Set each entry of `fields` on the object at `index` of `field`.
    ///
    /// Other keys of the element are kept. Returns [`RepositoryError::NotFound`]
    /// when `index` is out of range; no element is ever created.
    async fn set_array_element_at(
        &self,
        user: UserId,
        field: ArrayField,
        index: usize,
        fields: Map<String, Value>,
    ) -> Result<(), RepositoryError>;

    /// Remove every element of `field` whose `key` equals `value`.
    ///
    /// Survivors keep their relative order. Returns how many were removed; when
    /// nothing matched the document and its `version` are left untouched.
    async fn remove_matching_from_array(
        &self,
        user: UserId,
        field: ArrayField,
        key: &str,
        value: Value,
    ) -> Result<usize, RepositoryError>;

    /// Sum the numeric `key` of every element of `field`, computed by the store.
    ///
    /// An empty array sums to zero. With `at_version`, the sum is only returned
    /// if the document is still at that version; otherwise
    /// [`RepositoryError::Conflict`] is returned.
    async fn sum_field(
        &self,
        user: UserId,
        field: ArrayField,
        key: &str,
        at_version: Option<i64>,
    ) -> Result<Decimal, RepositoryError>;

    /// Append a fully built order to `orders` in a single write.
    ///
    /// With `clear_cart_at_version`, the same write also empties the cart, and
    /// only succeeds if the document is still at that version; otherwise
    /// [`RepositoryError::Conflict`] is returned and nothing is written.
    async fn append_order(
        &self,
        user: UserId,
        order: Value,
        clear_cart_at_version: Option<i64>,
    ) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `acquire_timeout` - How long to wait for a free connection
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(acquire_timeout)
        .connect(database_url.expose_secret())
        .await
}

/// Read a numeric document value as a decimal.
///
/// Prices are stored as decimal strings but numbers are accepted too.
/// `null` and missing values count as absent.
pub(crate) fn decimal_from_value(value: Option<&Value>) -> Result<Option<Decimal>, RepositoryError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid decimal {s:?}: {e}"))),
        Some(Value::Number(n)) => n
            .to_string()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid decimal {n}: {e}"))),
        Some(other) => Err(RepositoryError::DataCorruption(format!(
            "expected a number, found {other}"
        ))),
    }
}
