//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Store;
use crate::services::aws::CloudAdapters;
use crate::services::order_numbers::OrderNumberGenerator;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the cloud adapters and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<dyn Store>,
    cloud: CloudAdapters,
    order_numbers: OrderNumberGenerator,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Repositories, in-memory or `PostgreSQL`
    /// * `cloud` - Cloud resource adapters
    #[must_use]
    pub fn new(config: StorefrontConfig, store: Arc<dyn Store>, cloud: CloudAdapters) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                cloud,
                order_numbers: OrderNumberGenerator::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the repositories.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the cloud resource adapters.
    #[must_use]
    pub fn cloud(&self) -> &CloudAdapters {
        &self.inner.cloud
    }

    /// Get a reference to the order number generator.
    #[must_use]
    pub fn order_numbers(&self) -> &OrderNumberGenerator {
        &self.inner.order_numbers
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.inner.store.backend())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
