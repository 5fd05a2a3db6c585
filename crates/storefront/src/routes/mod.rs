//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! # Products
//! GET    /api/products                 - List (?category, search, sort, minPrice, maxPrice, brand)
//! POST   /api/products                 - Create product
//! GET    /api/products/featured        - Featured products
//! GET    /api/products/related/{id}    - Up to four products in the same category
//! GET    /api/products/{id}            - Product detail
//!
//! # Orders
//! POST   /api/orders                   - Checkout (order + items)
//! GET    /api/orders                   - All orders with items
//! GET    /api/orders/{id}              - Order with items
//! POST   /api/orders/process           - Simulated payment processing
//!
//! # Newsletter
//! POST   /api/subscribe                - Subscribe, returns discount code
//!
//! # Profile
//! GET    /api/profile                  - Current profile
//! PUT    /api/profile                  - Update profile
//! PUT    /api/profile/password         - Change password
//!
//! # Cloud admin
//! GET    /api/aws/config               - Credential status and region
//! POST   /api/aws/s3/upload            - Multipart upload (field `file`)
//! GET    /api/aws/s3/list              - List keys (?prefix)
//! DELETE /api/aws/s3/files/{*key}      - Delete object
//! GET    /api/aws/cloudfront/distributions - List distributions
//! POST   /api/aws/cloudfront/invalidate    - Invalidate paths
//! GET    /api/aws/lambda/functions         - List functions
//! POST   /api/aws/lambda/invoke/{name}     - Invoke function
//! ```

pub mod account;
pub mod aws;
pub mod newsletter;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/featured", get(products::featured))
        .route("/related/{id}", get(products::related))
        .route("/{id}", get(products::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/process", post(orders::process))
        .route("/{id}", get(orders::show))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::show).put(account::update))
        .route("/password", put(account::change_password))
}

/// Create the cloud admin routes router.
pub fn aws_routes() -> Router<AppState> {
    Router::new()
        .route("/config", get(aws::config))
        .route("/s3/upload", post(aws::upload))
        .route("/s3/list", get(aws::list_files))
        .route("/s3/files/{*key}", delete(aws::delete_file))
        .route("/cloudfront/distributions", get(aws::list_distributions))
        .route("/cloudfront/invalidate", post(aws::invalidate))
        .route("/lambda/functions", get(aws::list_functions))
        .route("/lambda/invoke/{function_name}", post(aws::invoke_function))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
        .route("/api/subscribe", post(newsletter::subscribe))
        .nest("/api/profile", profile_routes())
        .nest("/api/aws", aws_routes())
}
