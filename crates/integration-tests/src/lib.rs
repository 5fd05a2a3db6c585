//! Integration tests for the Aviator storefront.
//!
//! The tests drive the full router (middleware included) in-process with
//! `tower::ServiceExt::oneshot`, backed by an in-memory store seeded with the
//! built-in catalog and a fake cloud that records what it was asked to do.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aviator-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `products` - Catalog listing, filtering and detail
//! - `orders` - Checkout, order lookup and payment simulation
//! - `subscribe` - Newsletter sign-up
//! - `profile` - Account profile endpoints
//! - `aws` - Cloud admin endpoints against the fake cloud
//! - `health` - Health checks and response middleware

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use aviator_core::{
    Email, EmailSubscription, NewEmailSubscription, NewOrder, NewOrderItem, NewProduct, Order,
    OrderId, OrderItem, Product, ProductId,
};
use aviator_storefront::build_app;
use aviator_storefront::config::StorefrontConfig;
use aviator_storefront::db::{
    CatalogRepository, MemoryStore, OrderRepository, RepositoryError, Store,
    SubscriptionRepository, seed,
};
use aviator_storefront::services::aws::{
    CdnService, CloudAdapters, CloudError, DistributionSummary, FunctionService,
    FunctionSummary, InvalidationSummary, ObjectStore,
};
use aviator_storefront::state::AppState;

/// What the fake cloud has been asked to do.
#[derive(Debug, Default)]
pub struct CloudLog {
    /// Uploaded objects by key, with their content type.
    pub objects: HashMap<String, (Vec<u8>, String)>,
    pub invalidations: Vec<(String, Vec<String>)>,
    pub invocations: Vec<(String, Value)>,
}

/// In-process stand-in for S3, CloudFront and Lambda.
///
/// With `failing` set every call returns a `CloudError`.
#[derive(Debug, Clone, Default)]
pub struct FakeCloud {
    log: Arc<Mutex<CloudLog>>,
    failing: bool,
}

impl FakeCloud {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// # Panics
    ///
    /// Panics if a previous test thread poisoned the log.
    pub fn log(&self) -> MutexGuard<'_, CloudLog> {
        self.log.lock().expect("cloud log poisoned")
    }

    fn check(&self, operation: &str) -> Result<(), CloudError> {
        if self.failing {
            return Err(CloudError::new(operation, "simulated outage"));
        }
        Ok(())
    }

    #[must_use]
    pub fn adapters(&self) -> CloudAdapters {
        CloudAdapters {
            storage: Arc::new(self.clone()),
            cdn: Arc::new(self.clone()),
            functions: Arc::new(self.clone()),
        }
    }
}

#[async_trait]
impl ObjectStore for FakeCloud {
    async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError> {
        self.check("S3 upload")?;
        self.log()
            .objects
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(self.file_url(key))
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>, CloudError> {
        self.check("S3 list")?;
        let mut keys: Vec<String> = self
            .log()
            .objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn delete_file(&self, key: &str) -> Result<(), CloudError> {
        self.check("S3 delete")?;
        self.log().objects.remove(key);
        Ok(())
    }

    fn file_url(&self, key: &str) -> String {
        format!("https://test-bucket.s3.us-east-1.amazonaws.com/{key}")
    }
}

#[async_trait]
impl CdnService for FakeCloud {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>, CloudError> {
        self.check("CloudFront list")?;
        Ok(vec![DistributionSummary {
            id: "E2TESTDIST".to_string(),
            domain_name: "d111111abcdef8.cloudfront.net".to_string(),
            enabled: true,
            status: "Deployed".to_string(),
            origins: vec!["test-bucket.s3.amazonaws.com".to_string()],
        }])
    }

    async fn invalidate_cache(
        &self,
        distribution_id: &str,
        paths: &[String],
    ) -> Result<InvalidationSummary, CloudError> {
        self.check("CloudFront invalidation")?;
        self.log()
            .invalidations
            .push((distribution_id.to_string(), paths.to_vec()));
        Ok(InvalidationSummary {
            id: "I2TESTINVALIDATION".to_string(),
            status: "InProgress".to_string(),
            create_time: None,
            paths: paths.to_vec(),
        })
    }
}

#[async_trait]
impl FunctionService for FakeCloud {
    async fn list_functions(&self) -> Result<Vec<FunctionSummary>, CloudError> {
        self.check("Lambda list")?;
        Ok(vec![FunctionSummary {
            name: Some("resize-image".to_string()),
            arn: Some("arn:aws:lambda:us-east-1:000000000000:function:resize-image".to_string()),
            runtime: Some("nodejs20.x".to_string()),
            description: None,
            last_modified: None,
            memory_size: Some(128),
            timeout: Some(3),
        }])
    }

    async fn invoke(&self, function_name: &str, payload: &Value) -> Result<Value, CloudError> {
        self.check("Lambda invoke")?;
        self.log()
            .invocations
            .push((function_name.to_string(), payload.clone()));
        Ok(serde_json::json!({ "echo": payload }))
    }
}

/// A [`MemoryStore`] whose order item writes fail.
///
/// Orders on their own are stored normally. A combined order-and-items write
/// fails as a whole and leaves the inner store untouched.
#[derive(Debug, Clone)]
pub struct FailingItemWrites {
    inner: Arc<MemoryStore>,
}

impl FailingItemWrites {
    fn failure() -> RepositoryError {
        RepositoryError::DataCorruption("order item write failed".to_string())
    }
}

#[async_trait]
impl CatalogRepository for FailingItemWrites {
    async fn get_products(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        self.inner.get_products(category).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.inner.get_product(id).await
    }

    async fn get_featured_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.inner.get_featured_products().await
    }

    async fn insert_product(
        &self,
        product: NewProduct,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Product, RepositoryError> {
        self.inner.insert_product(product, created_at).await
    }
}

#[async_trait]
impl OrderRepository for FailingItemWrites {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        self.inner.create_order(order).await
    }

    async fn get_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        self.inner.get_orders().await
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        self.inner.get_order(id).await
    }

    async fn create_order_item(&self, _item: NewOrderItem) -> Result<OrderItem, RepositoryError> {
        Err(Self::failure())
    }

    async fn create_order_with_items(
        &self,
        _order: NewOrder,
        _items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        Err(Self::failure())
    }

    async fn get_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        self.inner.get_order_items(order_id).await
    }
}

#[async_trait]
impl SubscriptionRepository for FailingItemWrites {
    async fn get_email_subscription(
        &self,
        email: &Email,
    ) -> Result<Option<EmailSubscription>, RepositoryError> {
        self.inner.get_email_subscription(email).await
    }

    async fn create_email_subscription(
        &self,
        subscription: NewEmailSubscription,
    ) -> Result<EmailSubscription, RepositoryError> {
        self.inner.create_email_subscription(subscription).await
    }
}

#[async_trait]
impl Store for FailingItemWrites {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }

    fn backend(&self) -> &'static str {
        "failing-item-writes"
    }
}

/// Configuration from defaults plus the given variables.
///
/// # Panics
///
/// Panics if a variable is invalid.
#[must_use]
pub fn test_config(vars: &[(&str, &str)]) -> StorefrontConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    StorefrontConfig::from_source(&|key| vars.get(key).cloned())
        .expect("invalid test configuration")
}

/// A running app: router plus handles on its backing services.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub cloud: FakeCloud,
}

impl TestApp {
    /// App on the built-in catalog with a healthy fake cloud.
    pub async fn new() -> Self {
        Self::with(test_config(&[]), FakeCloud::new()).await
    }

    /// # Panics
    ///
    /// Panics if the built-in catalog cannot be seeded.
    pub async fn with(config: StorefrontConfig, cloud: FakeCloud) -> Self {
        let store = seeded_store().await;
        Self::assemble(config, store.clone(), store, cloud)
    }

    /// App whose order item writes fail. `store` is the memory store behind
    /// the failing wrapper.
    pub async fn with_failing_item_writes() -> Self {
        let store = seeded_store().await;
        let failing = Arc::new(FailingItemWrites {
            inner: store.clone(),
        });
        Self::assemble(test_config(&[]), failing, store, FakeCloud::new())
    }

    fn assemble(
        config: StorefrontConfig,
        backend: Arc<dyn Store>,
        store: Arc<MemoryStore>,
        cloud: FakeCloud,
    ) -> Self {
        let state = AppState::new(config, backend, cloud.adapters());
        Self {
            router: build_app(state),
            store,
            cloud,
        }
    }

    /// Send `request` and return the status, headers and body.
    ///
    /// JSON bodies are parsed; anything else comes back as a JSON string
    /// (`Null` when empty).
    ///
    /// # Panics
    ///
    /// Panics if the router fails or the body cannot be read.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, headers, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.send(get(uri)).await;
        (status, body)
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let (status, _, body) = self.send(json_request("POST", uri, body)).await;
        (status, body)
    }

    pub async fn put(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        let (status, _, body) = self.send(json_request("PUT", uri, body)).await;
        (status, body)
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::delete(uri)
            .body(Body::empty())
            .expect("valid request");
        let (status, _, body) = self.send(request).await;
        (status, body)
    }
}

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let catalog = seed::builtin_catalog().expect("built-in catalog");
    seed::seed_catalog(store.as_ref(), catalog)
        .await
        .expect("seed catalog");
    store
}

/// # Panics
///
/// Panics if `uri` is not a valid URI.
#[must_use]
pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

/// # Panics
///
/// Panics if `uri` is not a valid URI.
#[must_use]
pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// A checkout body with valid customer and payment details around `items`.
#[must_use]
pub fn checkout_body(items: Value) -> Value {
    serde_json::json!({
        "customer": {
            "firstName": "Amelia",
            "lastName": "Earhart",
            "email": "amelia@example.com",
            "phone": "555-0100",
            "address": "1 Runway Rd",
            "city": "Atchison",
            "state": "KS",
            "zipCode": "66002",
            "country": "United States"
        },
        "items": items,
        "payment": {
            "method": "credit-card",
            "subtotal": 548.0,
            "shipping": 0.0,
            "tax": 43.84,
            "total": 591.84
        }
    })
}

/// Field paths listed in a validation error body.
#[must_use]
pub fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
