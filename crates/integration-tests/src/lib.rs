//! Integration tests for Cartline.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the storefront against PostgreSQL
//! cargo run -p cartline-cli -- migrate
//! cargo run -p cartline-storefront
//!
//! # Run the ignored integration tests
//! cargo test -p cartline-integration-tests -- --ignored
//! ```
//!
//! Tests talk to the server over HTTP and seed users and products directly
//! through the `PostgreSQL` document store, since neither has an HTTP
//! surface.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - server under test (default `http://localhost:8000`)
//! - `STOREFRONT_DATABASE_URL` - the database that server uses

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::Value;

use cartline_core::{Price, ProductId, UserId};
use cartline_storefront::db::{self, DocumentStore, PgDocumentStore};
use cartline_storefront::models::{Product, UserDocument};

/// Shared handles for one integration test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub store: PgDocumentStore,
}

impl TestContext {
    /// Connect to the server under test and its database.
    pub async fn new() -> Self {
        let base_url = std::env::var("STOREFRONT_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());
        let database_url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .map(SecretString::from)
            .expect("STOREFRONT_DATABASE_URL must be set");

        let pool = db::create_pool(&database_url, Duration::from_secs(10))
            .await
            .expect("Failed to connect to storefront database");

        Self {
            client: Client::new(),
            base_url,
            store: PgDocumentStore::new(pool),
        }
    }

    /// Insert a fresh user with an empty document.
    pub async fn user(&self) -> UserId {
        let user = UserDocument::new(UserId::generate());
        self.store
            .insert_user(&user)
            .await
            .expect("Failed to insert test user");
        user.id
    }

    /// Insert a product with the given name and price.
    pub async fn product(&self, name: &str, units: i64) -> ProductId {
        let product = Product {
            id: ProductId::generate(),
            name: name.to_string(),
            price: Price::from_units(units),
            rating: 4,
            image: format!("https://cdn.example.com/{name}.jpg"),
        };
        self.store
            .insert_product(&product)
            .await
            .expect("Failed to insert test product");
        product.id
    }

    /// Read a user document straight from the database.
    pub async fn document(&self, user: UserId) -> UserDocument {
        self.store
            .get_user(user)
            .await
            .expect("Failed to read user")
            .expect("User missing")
    }

    /// `GET` a path and return the status and JSON body.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("Request failed");
        Self::parts(resp).await
    }

    /// Send a JSON body with `method` and return the status and JSON body.
    pub async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &Value,
    ) -> (StatusCode, Value) {
        let resp = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Request failed");
        Self::parts(resp).await
    }

    async fn parts(resp: reqwest::Response) -> (StatusCode, Value) {
        let status = resp.status();
        let body = resp.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}
