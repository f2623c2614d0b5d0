//! Integration tests for the address routes.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`cartline-cli migrate`)
//! - The storefront running against it (`cargo run -p cartline-storefront`)

use reqwest::{Method, StatusCode};
use serde_json::{Value, json};

use cartline_integration_tests::TestContext;

fn address(house: &str) -> Value {
    json!({
        "house_name": house,
        "street_name": "Canal Street",
        "city_name": "Kochi",
        "pin_code": "682001",
    })
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_concurrent_adds_never_exceed_two() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;
    let path = format!("/addaddress?id={user}");
    let [body_a, body_b, body_c, body_d] = ["a", "b", "c", "d"].map(address);

    let (a, b, c, d) = tokio::join!(
        ctx.send_json(Method::POST, &path, &body_a),
        ctx.send_json(Method::POST, &path, &body_b),
        ctx.send_json(Method::POST, &path, &body_c),
        ctx.send_json(Method::POST, &path, &body_d),
    );

    let accepted = [a.0, b.0, c.0, d.0]
        .iter()
        .filter(|status| **status == StatusCode::OK)
        .count();
    assert_eq!(accepted, 2);
    assert_eq!(ctx.document(user).await.addresses.len(), 2);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_edit_and_delete() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;

    let (status, _) = ctx
        .send_json(Method::PUT, &format!("/edithomeaddress?id={user}"), &address("x"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    ctx.send_json(Method::POST, &format!("/addaddress?id={user}"), &address("home"))
        .await;
    let (status, _) = ctx
        .send_json(Method::PUT, &format!("/edithomeaddress?id={user}"), &address("villa"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let doc = ctx.document(user).await;
    assert_eq!(doc.addresses.first().map(|a| a.house.as_str()), Some("villa"));

    let (status, _) = ctx.get(&format!("/deleteaddresses?id={user}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ctx.document(user).await.addresses.is_empty());
}
