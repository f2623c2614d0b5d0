//! In-process document store.
//!
//! Documents are kept as JSON values behind a single `RwLock` per
//! collection, so every operation is atomic with respect to the document it
//! touches. Used by `STOREFRONT_STORE=memory` and by the unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use cartline_core::{ProductId, UserId};

use super::{AppendOutcome, ArrayField, DocumentStore, RepositoryError, decimal_from_value};
use crate::models::{Product, UserDocument};

#[derive(Debug, Default, Clone)]
struct StoredUser {
    cart: Vec<Value>,
    addresses: Vec<Value>,
    orders: Vec<Value>,
    version: i64,
}

impl StoredUser {
    const fn array(&self, field: ArrayField) -> &Vec<Value> {
        match field {
            ArrayField::Cart => &self.cart,
            ArrayField::Addresses => &self.addresses,
            ArrayField::Orders => &self.orders,
        }
    }

    const fn array_mut(&mut self, field: ArrayField) -> &mut Vec<Value> {
        match field {
            ArrayField::Cart => &mut self.cart,
            ArrayField::Addresses => &mut self.addresses,
            ArrayField::Orders => &mut self.orders,
        }
    }

    fn to_document(&self, id: UserId) -> Result<UserDocument, RepositoryError> {
        let value = serde_json::json!({
            "_id": id,
            "cart": self.cart,
            "addresses": self.addresses,
            "orders": self.orders,
            "version": self.version,
        });
        serde_json::from_value(value)
            .map_err(|e| RepositoryError::DataCorruption(format!("user {id}: {e}")))
    }
}

fn to_values<T: serde::Serialize>(items: &[T]) -> Result<Vec<Value>, RepositoryError> {
    items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| RepositoryError::DataCorruption(e.to_string()))
}

/// Document store backed by in-process hash maps.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    users: RwLock<HashMap<UserId, StoredUser>>,
    products: RwLock<HashMap<ProductId, Product>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserDocument>, RepositoryError> {
        let users = self.users.read().await;
        users.get(&id).map(|u| u.to_document(id)).transpose()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn insert_user(&self, user: &UserDocument) -> Result<(), RepositoryError> {
        let stored = StoredUser {
            cart: to_values(&user.cart)?,
            addresses: to_values(&user.addresses)?,
            orders: to_values(&user.orders)?,
            version: user.version,
        };

        let mut users = self.users.write().await;
        if users.contains_key(&user.id) {
            return Err(RepositoryError::Conflict(format!(
                "user {} already exists",
                user.id
            )));
        }
        users.insert(user.id, stored);
        Ok(())
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(RepositoryError::Conflict(format!(
                "product {} already exists",
                product.id
            )));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn append_to_array(
        &self,
        user: UserId,
        field: ArrayField,
        value: Value,
        max_len: Option<usize>,
    ) -> Result<AppendOutcome, RepositoryError> {
        let mut users = self.users.write().await;
        let doc = users.get_mut(&user).ok_or(RepositoryError::NotFound)?;

        if max_len.is_some_and(|max| doc.array(field).len() >= max) {
            return Ok(AppendOutcome::Full);
        }

        doc.array_mut(field).push(value);
        doc.version += 1;
        Ok(AppendOutcome::Appended)
    }

    async fn overwrite_array(
        &self,
        user: UserId,
        field: ArrayField,
        values: Vec<Value>,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let doc = users.get_mut(&user).ok_or(RepositoryError::NotFound)?;
        *doc.array_mut(field) = values;
        doc.version += 1;
        Ok(())
    }

    async fn set_array_element_at(
        &self,
        user: UserId,
        field: ArrayField,
        index: usize,
        fields: Map<String, Value>,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let doc = users.get_mut(&user).ok_or(RepositoryError::NotFound)?;

        let element = doc
            .array_mut(field)
            .get_mut(index)
            .ok_or(RepositoryError::NotFound)?;
        let Value::Object(object) = element else {
            return Err(RepositoryError::DataCorruption(format!(
                "{field}[{index}] is not an object"
            )));
        };
        object.extend(fields);

        doc.version += 1;
        Ok(())
    }

    async fn remove_matching_from_array(
        &self,
        user: UserId,
        field: ArrayField,
        key: &str,
        value: Value,
    ) -> Result<usize, RepositoryError> {
        let mut users = self.users.write().await;
        let doc = users.get_mut(&user).ok_or(RepositoryError::NotFound)?;

        let array = doc.array_mut(field);
        let before = array.len();
        array.retain(|element| element.get(key) != Some(&value));
        let removed = before - array.len();

        if removed > 0 {
            doc.version += 1;
        }
        Ok(removed)
    }

    async fn sum_field(
        &self,
        user: UserId,
        field: ArrayField,
        key: &str,
        at_version: Option<i64>,
    ) -> Result<Decimal, RepositoryError> {
        let users = self.users.read().await;
        let doc = users.get(&user).ok_or(RepositoryError::NotFound)?;

        if let Some(expected) = at_version.filter(|&v| v != doc.version) {
            return Err(RepositoryError::Conflict(format!(
                "user {user} changed before summing {field} (expected version {expected}, found {})",
                doc.version
            )));
        }

        let mut total = Decimal::ZERO;
        for element in doc.array(field) {
            if let Some(amount) = decimal_from_value(element.get(key))? {
                total += amount;
            }
        }
        Ok(total)
    }

    async fn append_order(
        &self,
        user: UserId,
        order: Value,
        clear_cart_at_version: Option<i64>,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        let doc = users.get_mut(&user).ok_or(RepositoryError::NotFound)?;

        if let Some(expected) = clear_cart_at_version {
            if doc.version != expected {
                return Err(RepositoryError::Conflict(format!(
                    "user {user} changed during checkout (expected version {expected}, found {})",
                    doc.version
                )));
            }
            doc.cart.clear();
        }

        doc.orders.push(order);
        doc.version += 1;
        Ok(())
    }
}
