//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{StoreBackend, StorefrontConfig};
use crate::db::{self, DocumentStore, MemoryDocumentStore, PgDocumentStore, TimeoutStore};
use crate::services::{AddressService, CartService, CheckoutService, Clock, SystemClock};

/// How long to wait for a pooled `PostgreSQL` connection.
const POOL_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// document store and the services built on it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn DocumentStore>,
    cart: CartService,
    addresses: AddressService,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state using the system clock.
    ///
    /// # Arguments
    ///
    /// * `store` - Shared document store
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a new application state with an explicit clock.
    #[must_use]
    pub fn with_clock(
        store: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                cart: CartService::new(Arc::clone(&store)),
                addresses: AddressService::new(Arc::clone(&store)),
                checkout: CheckoutService::new(Arc::clone(&store), clock),
                store,
            }),
        }
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    /// Get a reference to the address service.
    #[must_use]
    pub fn addresses(&self) -> &AddressService {
        &self.inner.addresses
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}

/// Open the configured document store, bounded by the configured timeout.
///
/// # Errors
///
/// Returns `sqlx::Error` if the `PostgreSQL` pool cannot be created.
pub async fn open_store(config: &StorefrontConfig) -> Result<Arc<dyn DocumentStore>, sqlx::Error> {
    let store: Arc<dyn DocumentStore> = match &config.store {
        StoreBackend::Postgres { database_url } => {
            let pool = db::create_pool(database_url, POOL_ACQUIRE_TIMEOUT).await?;
            Arc::new(TimeoutStore::new(
                PgDocumentStore::new(pool),
                config.store_timeout,
            ))
        }
        StoreBackend::Memory => Arc::new(TimeoutStore::new(
            MemoryDocumentStore::new(),
            config.store_timeout,
        )),
    };
    Ok(store)
}
