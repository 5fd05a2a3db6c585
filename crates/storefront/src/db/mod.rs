//! Repositories for products, orders and email subscriptions.
//!
//! Handlers talk to the [`Store`] trait object held in the application state.
//! Two implementations exist:
//!
//! - [`memory::MemoryStore`] - keyed in-memory tables, used when no database
//!   is configured and in tests
//! - [`postgres::PgStore`] - `PostgreSQL` tables with unique constraints on
//!   `orders.order_number` and `email_subscriptions.email`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p aviator-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;
pub mod seed;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use aviator_core::{
    Email, EmailSubscription, NewEmailSubscription, NewOrder, NewOrderItem, NewProduct, Order,
    OrderId, OrderItem, Product, ProductId,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use seed::SeedError;

use crate::config::StorefrontConfig;

/// Most products returned by [`CatalogRepository::get_related_products`].
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// Errors that can occur during repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Product catalog access.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// All products, optionally restricted to an exact category.
    async fn get_products(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn get_featured_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Store a product stamped with `created_at`, assigning the next id.
    async fn insert_product(
        &self,
        product: NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<Product, RepositoryError>;

    /// Store a product stamped with the current time.
    async fn create_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        self.insert_product(product, Utc::now()).await
    }

    /// Up to [`RELATED_PRODUCTS_LIMIT`] other products in the same category,
    /// in repository order. Unknown ids have no related products.
    async fn get_related_products(&self, id: ProductId) -> Result<Vec<Product>, RepositoryError> {
        let Some(product) = self.get_product(id).await? else {
            return Ok(Vec::new());
        };

        Ok(self
            .get_products(Some(&product.info.category))
            .await?
            .into_iter()
            .filter(|candidate| candidate.id != id)
            .take(RELATED_PRODUCTS_LIMIT)
            .collect())
    }
}

/// Orders and their line items.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store an order, assigning the next id.
    ///
    /// Returns `RepositoryError::Conflict` if the order number is taken.
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError>;

    /// All orders in creation order.
    async fn get_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Store a line item. The referenced order is not checked.
    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem, RepositoryError>;

    /// Store an order and its line items as one unit.
    ///
    /// Each item's `order_id` is replaced by the id of the new order. Either
    /// everything is stored or nothing is.
    async fn create_order_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError>;

    /// Items for `order_id` in insertion order.
    async fn get_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError>;
}

/// Newsletter subscriptions.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get_email_subscription(
        &self,
        email: &Email,
    ) -> Result<Option<EmailSubscription>, RepositoryError>;

    /// Returns `RepositoryError::Conflict` if the email is already subscribed.
    async fn create_email_subscription(
        &self,
        subscription: NewEmailSubscription,
    ) -> Result<EmailSubscription, RepositoryError>;
}

/// Everything the HTTP layer needs from storage.
#[async_trait]
pub trait Store: CatalogRepository + OrderRepository + SubscriptionRepository {
    /// Cheap connectivity check for readiness.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Short name for logs.
    fn backend(&self) -> &'static str;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Errors opening the configured store.
#[derive(Debug, thiserror::Error)]
pub enum StoreInitError {
    #[error("failed to connect to database: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to seed catalog: {0}")]
    Seed(#[from] SeedError),
}

/// Open the store selected by the configuration.
///
/// With a database URL this connects to `PostgreSQL`; migrations and
/// seeding are left to `aviator-cli`. Otherwise an in-memory store is
/// created and seeded from `catalog_path` or the built-in catalog.
///
/// # Errors
///
/// Returns `StoreInitError` if the database is unreachable or the catalog
/// cannot be loaded.
pub async fn open_store(config: &StorefrontConfig) -> Result<Arc<dyn Store>, StoreInitError> {
    if let Some(database_url) = &config.database_url {
        let pool = create_pool(database_url).await?;
        tracing::info!("Database pool created");
        return Ok(Arc::new(PgStore::new(pool)));
    }

    let store = MemoryStore::new();
    let catalog = seed::load_catalog(config.catalog_path.as_deref()).await?;
    seed::seed_catalog(&store, catalog).await?;
    tracing::info!("Using in-memory store");
    Ok(Arc::new(store))
}
