//! Checkout route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use cartline_core::{ProductId, UserId};

use super::{Confirmation, UserQuery, required_param};
use crate::error::{AppError, Endpoint, Result};
use crate::state::AppState;

/// Query string for instant buy: `pid` is the product, `id` the user.
#[derive(Debug, Deserialize)]
pub struct InstantBuyQuery {
    pub pid: Option<String>,
    pub id: Option<String>,
}

/// Place an order for the user's whole cart.
#[instrument(skip(state, query))]
pub async fn checkout_cart(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Confirmation>> {
    let user_id: UserId = required_param(query.id.as_deref(), "id", Endpoint::CartCheckout)?;

    let order = state
        .checkout()
        .checkout_cart(user_id)
        .await
        .map_err(|e| AppError::from_service(Endpoint::CartCheckout, e))?;

    Ok(Json(Confirmation::with_order(
        "Successfully placed the order",
        order.id,
    )))
}

/// Place an order for a single product without touching the cart.
#[instrument(skip(state, query))]
pub async fn instant_buy(
    State(state): State<AppState>,
    Query(query): Query<InstantBuyQuery>,
) -> Result<Json<Confirmation>> {
    let product_id: ProductId =
        required_param(query.pid.as_deref(), "pid", Endpoint::InstantBuy)?;
    let user_id: UserId = required_param(query.id.as_deref(), "id", Endpoint::InstantBuy)?;

    let order = state
        .checkout()
        .instant_buy(user_id, product_id)
        .await
        .map_err(|e| AppError::from_service(Endpoint::InstantBuy, e))?;

    Ok(Json(Confirmation::with_order(
        "Successfully placed the order",
        order.id,
    )))
}
