//! Time-bounded store decorator.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use cartline_core::{ProductId, UserId};

use super::{AppendOutcome, ArrayField, DocumentStore, RepositoryError};
use crate::models::{Product, UserDocument};

/// Wraps a [`DocumentStore`] so every call fails with
/// [`RepositoryError::Timeout`] instead of hanging past `timeout`.
#[derive(Debug)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: DocumentStore> TimeoutStore<S> {
    /// Wrap `inner`, bounding each operation by `timeout`.
    #[must_use]
    pub const fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, RepositoryError>> + Send,
    ) -> Result<T, RepositoryError> {
        tokio::time::timeout(self.timeout, fut).await.unwrap_or_else(|_| {
            tracing::warn!(operation, timeout = ?self.timeout, "store operation timed out");
            Err(RepositoryError::Timeout)
        })
    }
}

#[async_trait]
impl<S: DocumentStore> DocumentStore for TimeoutStore<S> {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.bounded("ping", self.inner.ping()).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserDocument>, RepositoryError> {
        self.bounded("get_user", self.inner.get_user(id)).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.bounded("get_product", self.inner.get_product(id)).await
    }

    async fn insert_user(&self, user: &UserDocument) -> Result<(), RepositoryError> {
        self.bounded("insert_user", self.inner.insert_user(user)).await
    }

    async fn insert_product(&self, product: &Product) -> Result<(), RepositoryError> {
        self.bounded("insert_product", self.inner.insert_product(product))
            .await
    }

    async fn append_to_array(
        &self,
        user: UserId,
        field: ArrayField,
        value: Value,
        max_len: Option<usize>,
    ) -> Result<AppendOutcome, RepositoryError> {
        self.bounded(
            "append_to_array",
            self.inner.append_to_array(user, field, value, max_len),
        )
        .await
    }

    async fn overwrite_array(
        &self,
        user: UserId,
        field: ArrayField,
        values: Vec<Value>,
    ) -> Result<(), RepositoryError> {
        self.bounded(
            "overwrite_array",
            self.inner.overwrite_array(user, field, values),
        )
        .await
    }

    async fn set_array_element_at(
        &self,
        user: UserId,
        field: ArrayField,
        index: usize,
        fields: Map<String, Value>,
    ) -> Result<(), RepositoryError> {
        self.bounded(
            "set_array_element_at",
            self.inner.set_array_element_at(user, field, index, fields),
        )
        .await
    }

    async fn remove_matching_from_array(
        &self,
        user: UserId,
        field: ArrayField,
        key: &str,
        value: Value,
    ) -> Result<usize, RepositoryError> {
        self.bounded(
            "remove_matching_from_array",
            self.inner.remove_matching_from_array(user, field, key, value),
        )
        .await
    }

    async fn sum_field(
        &self,
        user: UserId,
        field: ArrayField,
        key: &str,
        at_version: Option<i64>,
    ) -> Result<Decimal, RepositoryError> {
        self.bounded("sum_field", self.inner.sum_field(user, field, key, at_version))
            .await
    }

    async fn append_order(
        &self,
        user: UserId,
        order: Value,
        clear_cart_at_version: Option<i64>,
    ) -> Result<(), RepositoryError> {
        self.bounded(
            "append_order",
            self.inner.append_order(user, order, clear_cart_at_version),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;

    /// A store whose reads never complete.
    struct StalledStore;

    #[async_trait]
    impl DocumentStore for StalledStore {
        async fn ping(&self) -> Result<(), RepositoryError> {
            std::future::pending().await
        }
        async fn get_user(&self, _: UserId) -> Result<Option<UserDocument>, RepositoryError> {
            std::future::pending().await
        }
        async fn get_product(&self, _: ProductId) -> Result<Option<Product>, RepositoryError> {
            std::future::pending().await
        }
        async fn insert_user(&self, _: &UserDocument) -> Result<(), RepositoryError> {
            std::future::pending().await
        }
        async fn insert_product(&self, _: &Product) -> Result<(), RepositoryError> {
            std::future::pending().await
        }
        async fn append_to_array(
            &self,
            _: UserId,
            _: ArrayField,
            _: Value,
            _: Option<usize>,
        ) -> Result<AppendOutcome, RepositoryError> {
            std::future::pending().await
        }
        async fn overwrite_array(
            &self,
            _: UserId,
            _: ArrayField,
            _: Vec<Value>,
        ) -> Result<(), RepositoryError> {
            std::future::pending().await
        }
        async fn set_array_element_at(
            &self,
            _: UserId,
            _: ArrayField,
            _: usize,
            _: Map<String, Value>,
        ) -> Result<(), RepositoryError> {
            std::future::pending().await
        }
        async fn remove_matching_from_array(
            &self,
            _: UserId,
            _: ArrayField,
            _: &str,
            _: Value,
        ) -> Result<usize, RepositoryError> {
            std::future::pending().await
        }
        async fn sum_field(
            &self,
            _: UserId,
            _: ArrayField,
            _: &str,
            _: Option<i64>,
        ) -> Result<Decimal, RepositoryError> {
            std::future::pending().await
        }
        async fn append_order(
            &self,
            _: UserId,
            _: Value,
            _: Option<i64>,
        ) -> Result<(), RepositoryError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_call_times_out() {
        let store = TimeoutStore::new(StalledStore, Duration::from_secs(5));
        let err = store.get_user(UserId::generate()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Timeout));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let store = TimeoutStore::new(MemoryDocumentStore::new(), Duration::from_secs(5));
        let id = UserId::generate();
        store.insert_user(&UserDocument::new(id)).await.unwrap();
        assert!(store.get_user(id).await.unwrap().is_some());
    }
}
