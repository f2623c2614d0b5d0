//! Integration tests for the checkout routes.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`cartline-cli migrate`)
//! - The storefront running against it (`cargo run -p cartline-storefront`)

use reqwest::StatusCode;

use cartline_core::{Price, ProductId};
use cartline_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_checkout_snapshots_and_clears_cart() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;
    let lamp = ctx.product("lamp", 40).await;
    let pen = ctx.product("pen", 10).await;
    for product in [lamp, pen] {
        ctx.get(&format!("/addtocart?id={product}&normal={user}"))
            .await;
    }

    let (status, body) = ctx.get(&format!("/cartcheckout?id={user}")).await;

    assert_eq!(status, StatusCode::OK);
    let doc = ctx.document(user).await;
    assert!(doc.cart.is_empty());
    let order = doc.orders.first().expect("order written");
    assert_eq!(body["order_id"], order.id.to_string());
    assert_eq!(order.total, Price::from_units(50));
    assert_eq!(order.items.len(), 2);
    assert!(order.payment_method.cod);
    assert!(!order.payment_method.digital);
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_instant_buy_leaves_cart_alone() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;
    let pen = ctx.product("pen", 10).await;
    let lamp = ctx.product("lamp", 40).await;
    ctx.get(&format!("/addtocart?id={pen}&normal={user}"))
        .await;

    let (status, _) = ctx.get(&format!("/instantbuy?pid={lamp}&id={user}")).await;

    assert_eq!(status, StatusCode::OK);
    let doc = ctx.document(user).await;
    assert_eq!(doc.cart.len(), 1);
    assert_eq!(doc.orders.first().map(|o| o.total), Some(Price::from_units(40)));
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_instant_buy_unknown_product() {
    let ctx = TestContext::new().await;
    let user = ctx.user().await;

    let (status, _) = ctx
        .get(&format!("/instantbuy?pid={}&id={user}", ProductId::generate()))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(ctx.document(user).await.orders.is_empty());
}
