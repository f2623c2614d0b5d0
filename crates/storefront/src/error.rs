//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! The same service failure maps to different statuses on different routes,
//! so handlers convert through [`AppError::from_service`] with their
//! [`Endpoint`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::ServiceError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    /// Document store operation failed on a route that reports store
    /// failures as 404.
    #[error("Store rejected request: {0}")]
    StoreRejected(RepositoryError),

    /// A referenced document does not exist, on a route that reports this as
    /// a server-side failure.
    #[error("Unresolved reference: {0}")]
    Unresolved(String),

    /// Resource not found, or a required query parameter missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A dependency is not reachable.
    #[error("Service unavailable")]
    Unavailable,
}

/// The route an error is reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    AddToCart,
    RemoveItem,
    ListCart,
    AddAddress,
    EditAddress,
    DeleteAddresses,
    CartCheckout,
    InstantBuy,
}

impl AppError {
    /// A missing, blank or malformed query parameter.
    ///
    /// Add-to-cart answers 400; every other route answers 404.
    #[must_use]
    pub fn invalid_param(endpoint: Endpoint, message: impl Into<String>) -> Self {
        match endpoint {
            Endpoint::AddToCart => Self::BadRequest(message.into()),
            _ => Self::NotFound(message.into()),
        }
    }

    /// Convert a service failure into the response `endpoint` gives for it.
    #[must_use]
    pub fn from_service(endpoint: Endpoint, err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::BadRequest(msg),
            ServiceError::LimitExceeded => {
                Self::BadRequest(ServiceError::LimitExceeded.to_string())
            }
            ServiceError::NotFound(what) => {
                let message = format!("{what} not found");
                match endpoint {
                    Endpoint::InstantBuy if what == "product" => Self::BadRequest(message),
                    Endpoint::EditAddress | Endpoint::DeleteAddresses => Self::NotFound(message),
                    _ => Self::Unresolved(message),
                }
            }
            ServiceError::Store(e) => match endpoint {
                Endpoint::DeleteAddresses => Self::StoreRejected(e),
                _ => Self::Store(e),
            },
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) | Self::Unresolved(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::StoreRejected(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Store(_) | Self::StoreRejected(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if matches!(self, Self::Unresolved(_)) {
            tracing::warn!(error = %self, "Request error");
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(_) => "Internal server error".to_string(),
            Self::StoreRejected(_) => "Request could not be completed".to_string(),
            Self::Unresolved(msg) | Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Unavailable => "Service unavailable".to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
