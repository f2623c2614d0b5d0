//! Service error types.

use thiserror::Error;

use cartline_core::AddressSlot;

use crate::db::RepositoryError;

/// Errors that can occur in the cart, address and checkout services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required field is missing or malformed. Raised before any write.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced user, product or address slot does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The user already holds the maximum number of addresses.
    #[error("address limit of {} reached", AddressSlot::CAPACITY)]
    LimitExceeded,

    /// The document store failed, timed out or rejected a concurrent write.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}

impl ServiceError {
    /// Map a store error from a call addressed to a user document, reading
    /// `NotFound` as "no such user".
    pub(crate) fn user_scoped(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("user"),
            other => Self::Store(other),
        }
    }
}
