//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (store ping)
//!
//! # Cart
//! GET  /addtocart?id=&normal=  - Copy product `id` into user `normal`'s cart
//! GET  /removeitem?id=&normal= - Remove every cart line for product `id`
//! GET  /listcart?id=           - Cart items and total for user `id`
//!
//! # Addresses
//! POST /addaddress?id=         - Add an address (JSON body) to the next slot
//! PUT  /edithomeaddress?id=    - Overwrite the home slot (JSON body)
//! PUT  /editworkaddress?id=    - Overwrite the work slot (JSON body)
//! GET  /deleteaddresses?id=    - Remove both addresses
//!
//! # Checkout
//! GET  /cartcheckout?id=       - Place an order for the whole cart
//! GET  /instantbuy?pid=&id=    - Place an order for product `pid` alone
//! ```

pub mod address;
pub mod cart;
pub mod checkout;
pub mod health;

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use cartline_core::OrderId;

use crate::error::{AppError, Endpoint};
use crate::state::AppState;

/// Query string naming a user as `id`.
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub id: Option<String>,
}

/// Success body returned by mutating routes.
#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
}

impl Confirmation {
    #[must_use]
    pub const fn new(message: &'static str) -> Self {
        Self {
            message,
            order_id: None,
        }
    }

    #[must_use]
    pub const fn with_order(message: &'static str, order_id: OrderId) -> Self {
        Self {
            message,
            order_id: Some(order_id),
        }
    }
}

/// Parse a required query parameter.
///
/// Absent and blank values are treated the same; both, and unparseable
/// values, are reported with the status `endpoint` uses for bad parameters.
pub(crate) fn required_param<T>(
    value: Option<&str>,
    name: &'static str,
    endpoint: Endpoint,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            AppError::invalid_param(endpoint, format!("missing query parameter `{name}`"))
        })?;

    raw.parse::<T>().map_err(|e| {
        AppError::invalid_param(endpoint, format!("invalid query parameter `{name}`: {e}"))
    })
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/addtocart", get(cart::add))
        .route("/removeitem", get(cart::remove))
        .route("/listcart", get(cart::list))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/addaddress", post(address::add))
        .route("/edithomeaddress", put(address::edit_home))
        .route("/editworkaddress", put(address::edit_work))
        .route("/deleteaddresses", get(address::delete_all))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/cartcheckout", get(checkout::checkout_cart))
        .route("/instantbuy", get(checkout::instant_buy))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(cart_routes())
        .merge(address_routes())
        .merge(checkout_routes())
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Drives the router in-process with `tower::ServiceExt::oneshot`.

    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::db::{DocumentStore, MemoryDocumentStore};
    use crate::services::FixedClock;
    use crate::state::AppState;

    pub fn test_state(store: Arc<dyn DocumentStore>) -> AppState {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        AppState::with_clock(store, Arc::new(clock))
    }

    pub fn memory_state() -> (AppState, Arc<MemoryDocumentStore>) {
        let store = Arc::new(MemoryDocumentStore::new());
        (test_state(store.clone()), store)
    }

    /// Send a request and return the status and the parsed JSON body.
    pub async fn send(
        state: AppState,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = super::routes()
            .with_state(state)
            .oneshot(request)
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
        send(state, Method::GET, uri, None).await
    }
}
