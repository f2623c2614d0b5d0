//! Cart route handlers.
//!
//! Users and products are addressed by query parameters: on add and remove
//! `id` is the product and `normal` the user; on list `id` is the user.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use cartline_core::{ProductId, UserId};

use super::{Confirmation, UserQuery, required_param};
use crate::error::{AppError, Endpoint, Result};
use crate::models::CartSummary;
use crate::state::AppState;

/// Query string for add and remove: `id` is the product, `normal` the user.
#[derive(Debug, Deserialize)]
pub struct CartLineQuery {
    pub id: Option<String>,
    pub normal: Option<String>,
}

/// Add a product to a user's cart.
#[instrument(skip(state, query))]
pub async fn add(
    State(state): State<AppState>,
    Query(query): Query<CartLineQuery>,
) -> Result<Json<Confirmation>> {
    let product_id: ProductId =
        required_param(query.id.as_deref(), "id", Endpoint::AddToCart)?;
    let user_id: UserId =
        required_param(query.normal.as_deref(), "normal", Endpoint::AddToCart)?;

    state
        .cart()
        .add_item(user_id, product_id)
        .await
        .map_err(|e| AppError::from_service(Endpoint::AddToCart, e))?;

    Ok(Json(Confirmation::new("Successfully added to the cart")))
}

/// Remove every line for a product from a user's cart.
#[instrument(skip(state, query))]
pub async fn remove(
    State(state): State<AppState>,
    Query(query): Query<CartLineQuery>,
) -> Result<Json<Confirmation>> {
    let item_id: ProductId = required_param(query.id.as_deref(), "id", Endpoint::RemoveItem)?;
    let user_id: UserId =
        required_param(query.normal.as_deref(), "normal", Endpoint::RemoveItem)?;

    state
        .cart()
        .remove_item(user_id, item_id)
        .await
        .map_err(|e| AppError::from_service(Endpoint::RemoveItem, e))?;

    Ok(Json(Confirmation::new("Successfully removed from cart")))
}

/// List a user's cart with its total.
#[instrument(skip(state, query))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<CartSummary>> {
    let user_id: UserId = required_param(query.id.as_deref(), "id", Endpoint::ListCart)?;

    let summary = state
        .cart()
        .get_cart(user_id)
        .await
        .map_err(|e| AppError::from_service(Endpoint::ListCart, e))?;

    Ok(Json(summary))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use cartline_core::UserId;

    use crate::db::{ArrayField, DocumentStore};
    use crate::models::UserDocument;
    use crate::routes::test_support::{get, memory_state};
    use crate::services::testing::seed_product;

    #[tokio::test]
    async fn test_add_then_list() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();
        let pen = seed_product(&store, "pen", 10).await;
        let book = seed_product(&store, "book", 25).await;

        for product in [&pen, &book] {
            let (status, body) = get(
                state.clone(),
                &format!("/addtocart?id={}&normal={user}", product.id),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["message"], "Successfully added to the cart");
        }

        let (status, body) = get(state, &format!("/listcart?id={user}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], "35");
        assert_eq!(body["items"][0]["product_name"], "pen");
        assert_eq!(body["items"][1]["_id"], json!(book.id.to_string()));
    }

    #[tokio::test]
    async fn test_list_empty_cart_reports_zero() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();

        let (status, body) = get(state, &format!("/listcart?id={user}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "total": "0", "items": [] }));
    }

    #[tokio::test]
    async fn test_list_reports_prices_without_trailing_zeros() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();
        for price in ["10.00", "35.50"] {
            let line = json!({
                "_id": UserId::generate().to_string(),
                "product_name": "pen",
                "price": price,
                "rating": 4,
                "image": "pen.png",
            });
            store
                .append_to_array(user, ArrayField::Cart, line, None)
                .await
                .unwrap();
        }

        let (status, body) = get(state, &format!("/listcart?id={user}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], "45.5");
        assert_eq!(body["items"][0]["price"], "10");
        assert_eq!(body["items"][1]["price"], "35.5");
    }

    #[tokio::test]
    async fn test_add_with_missing_params_is_bad_request() {
        let (state, _) = memory_state();

        let (status, body) = get(state.clone(), "/addtocart?id=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("`id`"));

        let (status, _) = get(state, &format!("/addtocart?id={}", UserId::generate())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails_without_write() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();

        let (status, _) = get(
            state,
            &format!("/addtocart?id={}&normal={user}", UserId::generate()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.get_user(user).await.unwrap().unwrap().cart.is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_list_missing_params_are_not_found() {
        let (state, _) = memory_state();

        let (status, _) = get(state.clone(), "/removeitem?normal=").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(state, "/listcart").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unrecognized_query_keys_are_ignored() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();
        let pen = seed_product(&store, "pen", 10).await;

        let (status, _) = get(
            state.clone(),
            &format!("/addtocart?ref=mail&id={}&normal={user}", pen.id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(state, &format!("/listcart?id={user}&utm_source=mail")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], "10");
    }

    #[tokio::test]
    async fn test_list_unknown_user_is_server_error() {
        let (state, _) = memory_state();

        let (status, body) = get(state, &format!("/listcart?id={}", UserId::generate())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "user not found");
    }

    #[tokio::test]
    async fn test_remove_item() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();
        let pen = seed_product(&store, "pen", 10).await;
        get(state.clone(), &format!("/addtocart?id={}&normal={user}", pen.id)).await;

        let (status, _) = get(
            state.clone(),
            &format!("/removeitem?id={}&normal={user}", pen.id),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let (_, body) = get(state, &format!("/listcart?id={user}")).await;
        assert_eq!(body["items"], json!([]));
    }
}
