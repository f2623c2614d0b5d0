//! Address route handlers.
//!
//! The user is the `id` query parameter. Add and edit take the address as a
//! JSON body with `house_name`, `street_name`, `city_name` and `pin_code`.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use tracing::instrument;

use cartline_core::{AddressSlot, UserId};

use super::{Confirmation, UserQuery, required_param};
use crate::error::{AppError, Endpoint, Result};
use crate::models::AddressInput;
use crate::state::AppState;

fn address_body(
    body: std::result::Result<Json<AddressInput>, JsonRejection>,
) -> Result<AddressInput> {
    body.map(|Json(input)| input)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Add an address to the user's next free slot.
#[instrument(skip(state, query, body))]
pub async fn add(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    body: std::result::Result<Json<AddressInput>, JsonRejection>,
) -> Result<Json<Confirmation>> {
    let user_id: UserId = required_param(query.id.as_deref(), "id", Endpoint::AddAddress)?;
    let input = address_body(body)?;

    state
        .addresses()
        .add(user_id, input)
        .await
        .map_err(|e| AppError::from_service(Endpoint::AddAddress, e))?;

    Ok(Json(Confirmation::new("Successfully added the address")))
}

/// Overwrite the home address.
#[instrument(skip(state, query, body))]
pub async fn edit_home(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    body: std::result::Result<Json<AddressInput>, JsonRejection>,
) -> Result<Json<Confirmation>> {
    edit(&state, &query, body, AddressSlot::Home).await?;
    Ok(Json(Confirmation::new("Successfully updated the home address")))
}

/// Overwrite the work address.
#[instrument(skip(state, query, body))]
pub async fn edit_work(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    body: std::result::Result<Json<AddressInput>, JsonRejection>,
) -> Result<Json<Confirmation>> {
    edit(&state, &query, body, AddressSlot::Work).await?;
    Ok(Json(Confirmation::new("Successfully updated the work address")))
}

async fn edit(
    state: &AppState,
    query: &UserQuery,
    body: std::result::Result<Json<AddressInput>, JsonRejection>,
    slot: AddressSlot,
) -> Result<()> {
    let user_id: UserId = required_param(query.id.as_deref(), "id", Endpoint::EditAddress)?;
    let input = address_body(body)?;

    state
        .addresses()
        .edit(user_id, slot, input)
        .await
        .map_err(|e| AppError::from_service(Endpoint::EditAddress, e))
}

/// Remove both addresses.
#[instrument(skip(state, query))]
pub async fn delete_all(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Confirmation>> {
    let user_id: UserId =
        required_param(query.id.as_deref(), "id", Endpoint::DeleteAddresses)?;

    state
        .addresses()
        .clear(user_id)
        .await
        .map_err(|e| AppError::from_service(Endpoint::DeleteAddresses, e))?;

    Ok(Json(Confirmation::new("Successfully deleted the addresses")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{Value, json};

    use cartline_core::UserId;

    use crate::db::DocumentStore;
    use crate::models::UserDocument;
    use crate::routes::test_support::{get, memory_state, send};

    fn address(house: &str) -> Value {
        json!({
            "house_name": house,
            "street_name": "notebook",
            "city_name": "josua",
            "pin_code": "685607",
        })
    }

    #[tokio::test]
    async fn test_third_address_is_bad_request() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();
        let uri = format!("/addaddress?id={user}");

        for house in ["home", "work"] {
            let (status, _) = send(state.clone(), Method::POST, &uri, Some(address(house))).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) =
            send(state, Method::POST, &uri, Some(address("third"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "address limit of 2 reached");
        assert_eq!(store.get_user(user).await.unwrap().unwrap().addresses.len(), 2);
    }

    #[tokio::test]
    async fn test_add_missing_param_is_not_found() {
        let (state, _) = memory_state();

        let (status, _) = send(state, Method::POST, "/addaddress", Some(address("home"))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_edit_with_bad_body_is_bad_request() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();

        let (status, _) = send(
            state.clone(),
            Method::PUT,
            &format!("/edithomeaddress?id={user}"),
            Some(json!({ "house_name": "only" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut blank = address("home");
        blank["city_name"] = json!("");
        let (status, _) = send(
            state,
            Method::PUT,
            &format!("/editworkaddress?id={user}"),
            Some(blank),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_edit_work_slot() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();
        let add_uri = format!("/addaddress?id={user}");
        send(state.clone(), Method::POST, &add_uri, Some(address("home"))).await;
        send(state.clone(), Method::POST, &add_uri, Some(address("work"))).await;

        let (status, body) = send(
            state,
            Method::PUT,
            &format!("/editworkaddress?id={user}"),
            Some(address("office")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Successfully updated the work address");
        let doc = store.get_user(user).await.unwrap().unwrap();
        assert_eq!(doc.addresses[0].house, "home");
        assert_eq!(doc.addresses[1].house, "office");
    }

    #[tokio::test]
    async fn test_edit_absent_slot_is_not_found() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();

        let (status, _) = send(
            state,
            Method::PUT,
            &format!("/edithomeaddress?id={user}"),
            Some(address("home")),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(store.get_user(user).await.unwrap().unwrap().addresses.is_empty());
    }

    #[tokio::test]
    async fn test_delete_addresses() {
        let (state, store) = memory_state();
        let user = UserId::generate();
        store.insert_user(&UserDocument::new(user)).await.unwrap();
        send(
            state.clone(),
            Method::POST,
            &format!("/addaddress?id={user}"),
            Some(address("home")),
        )
        .await;

        let (status, _) = get(state.clone(), &format!("/deleteaddresses?id={user}")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(store.get_user(user).await.unwrap().unwrap().addresses.is_empty());

        let (status, _) = get(state, "/deleteaddresses").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_for_unknown_user_is_not_found() {
        let (state, _) = memory_state();

        let (status, _) =
            get(state, &format!("/deleteaddresses?id={}", UserId::generate())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
