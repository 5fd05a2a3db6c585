//! `PostgreSQL` repositories.
//!
//! Rows are read into private `*Row` structs and converted to the core types,
//! re-checking invariants the database cannot express (non-negative prices,
//! valid emails, known status names). A row that fails those checks surfaces
//! as `RepositoryError::DataCorruption`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use sqlx::types::Json;

use aviator_core::{
    Email, EmailSubscription, NewEmailSubscription, NewOrder, NewOrderItem, NewProduct, Order,
    OrderId, OrderItem, OrderItemId, OrderStatus, PaymentStatus, Price, Product, ProductId,
    ShippingAddress, SubscriptionId, UserId,
};

use super::{CatalogRepository, OrderRepository, RepositoryError, Store, SubscriptionRepository};

const PRODUCT_COLUMNS: &str = "id, name, description, price, image_url, category, brand, \
     popularity, available_sizes, available_colors, additional_images, materials_care, \
     details, rating, num_reviews, in_stock, featured, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, user_id, order_number, status, total, shipping_address, \
     payment_method, payment_status, created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str =
    "id, order_id, product_id, name, price, quantity, size, color, image_url";

const SUBSCRIPTION_COLUMNS: &str = "id, email, source, is_active, created_at";

/// Repositories backed by a connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn price(value: Decimal, column: &str) -> Result<Price, RepositoryError> {
    Price::new(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

/// Map unique violations to `Conflict`.
fn unique_violation(e: sqlx::Error, what: impl FnOnce() -> String) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what());
    }
    RepositoryError::Database(e)
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    image_url: String,
    category: String,
    brand: String,
    popularity: i32,
    available_sizes: Option<Json<Vec<String>>>,
    available_colors: Option<Json<Vec<String>>>,
    additional_images: Option<Json<Vec<String>>>,
    materials_care: Option<String>,
    details: Option<String>,
    rating: f64,
    num_reviews: i32,
    in_stock: bool,
    featured: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProductId::new(row.id),
            info: NewProduct {
                name: row.name,
                description: row.description,
                price: price(row.price, "product price")?,
                image_url: row.image_url,
                category: row.category,
                brand: row.brand,
                popularity: row.popularity,
                available_sizes: row.available_sizes.map(|j| j.0),
                available_colors: row.available_colors.map(|j| j.0),
                additional_images: row.additional_images.map(|j| j.0),
                materials_care: row.materials_care,
                details: row.details,
                rating: row.rating,
                num_reviews: row.num_reviews,
                in_stock: row.in_stock,
                featured: row.featured,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: Option<i32>,
    order_number: String,
    status: String,
    total: Decimal,
    shipping_address: Json<ShippingAddress>,
    payment_method: String,
    payment_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<OrderStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let payment_status = row
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: OrderId::new(row.id),
            info: NewOrder {
                user_id: row.user_id.map(UserId::new),
                order_number: row.order_number,
                status,
                total: price(row.total, "order total")?,
                shipping_address: row.shipping_address.0,
                payment_method: row.payment_method,
                payment_status,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    name: String,
    price: Decimal,
    quantity: i32,
    size: Option<String>,
    color: Option<String>,
    image_url: String,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} on order item {}",
                row.quantity, row.id
            ))
        })?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            info: NewOrderItem {
                order_id: OrderId::new(row.order_id),
                product_id: ProductId::new(row.product_id),
                name: row.name,
                price: price(row.price, "item price")?,
                quantity,
                size: row.size,
                color: row.color,
                image_url: row.image_url,
            },
        })
    }
}

#[derive(sqlx::FromRow)]
struct SubscriptionRow {
    id: i32,
    email: String,
    source: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for EmailSubscription {
    type Error = RepositoryError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: SubscriptionId::new(row.id),
            info: NewEmailSubscription {
                email,
                source: row.source,
                is_active: row.is_active,
            },
            created_at: row.created_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl CatalogRepository for PgStore {
    async fn get_products(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE ($1::TEXT IS NULL OR category = $1) ORDER BY id"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    async fn get_featured_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE featured ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }

    async fn insert_product(
        &self,
        product: NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products (name, description, price, image_url, category, brand, \
                 popularity, available_sizes, available_colors, additional_images, \
                 materials_care, details, rating, num_reviews, in_stock, featured, \
                 created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
                 $17, $17) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price.amount())
        .bind(&product.image_url)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.popularity)
        .bind(product.available_sizes.as_ref().map(Json))
        .bind(product.available_colors.as_ref().map(Json))
        .bind(product.additional_images.as_ref().map(Json))
        .bind(&product.materials_care)
        .bind(&product.details)
        .bind(product.rating)
        .bind(product.num_reviews)
        .bind(product.in_stock)
        .bind(product.featured)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        Product::try_from(row)
    }
}

async fn insert_order(conn: &mut PgConnection, order: &NewOrder) -> Result<Order, RepositoryError> {
    let row: OrderRow = sqlx::query_as(&format!(
        "INSERT INTO orders (user_id, order_number, status, total, shipping_address, \
             payment_method, payment_status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order.user_id)
    .bind(&order.order_number)
    .bind(order.status.as_str())
    .bind(order.total.amount())
    .bind(Json(&order.shipping_address))
    .bind(&order.payment_method)
    .bind(order.payment_status.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        unique_violation(e, || {
            format!("order number {} already exists", order.order_number)
        })
    })?;

    Order::try_from(row)
}

async fn insert_order_item(
    conn: &mut PgConnection,
    item: &NewOrderItem,
) -> Result<OrderItem, RepositoryError> {
    let quantity = i32::try_from(item.quantity).map_err(|_| {
        RepositoryError::DataCorruption(format!(
            "quantity {} does not fit the quantity column",
            item.quantity
        ))
    })?;

    let row: OrderItemRow = sqlx::query_as(&format!(
        "INSERT INTO order_items (order_id, product_id, name, price, quantity, size, color, \
             image_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {ORDER_ITEM_COLUMNS}"
    ))
    .bind(item.order_id)
    .bind(item.product_id)
    .bind(&item.name)
    .bind(item.price.amount())
    .bind(quantity)
    .bind(&item.size)
    .bind(&item.color)
    .bind(&item.image_url)
    .fetch_one(&mut *conn)
    .await?;

    OrderItem::try_from(row)
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert_order(&mut conn, &order).await
    }

    async fn get_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY id"))
                .fetch_all(&self.pool)
                .await?;

        convert_all(rows)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Order::try_from).transpose()
    }

    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert_order_item(&mut conn, &item).await
    }

    async fn create_order_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let order = insert_order(&mut tx, &order).await?;
        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            let item = NewOrderItem {
                order_id: order.id,
                ..item
            };
            stored.push(insert_order_item(&mut tx, &item).await?);
        }

        // Dropping `tx` on an early return rolls everything back.
        tx.commit().await?;
        Ok((order, stored))
    }

    async fn get_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        convert_all(rows)
    }
}

#[async_trait]
impl SubscriptionRepository for PgStore {
    async fn get_email_subscription(
        &self,
        email: &Email,
    ) -> Result<Option<EmailSubscription>, RepositoryError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM email_subscriptions WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EmailSubscription::try_from).transpose()
    }

    async fn create_email_subscription(
        &self,
        subscription: NewEmailSubscription,
    ) -> Result<EmailSubscription, RepositoryError> {
        let row: SubscriptionRow = sqlx::query_as(&format!(
            "INSERT INTO email_subscriptions (email, source, is_active) \
             VALUES ($1, $2, $3) \
             RETURNING {SUBSCRIPTION_COLUMNS}"
        ))
        .bind(&subscription.email)
        .bind(&subscription.source)
        .bind(subscription.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            unique_violation(e, || format!("{} is already subscribed", subscription.email))
        })?;

        EmailSubscription::try_from(row)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_row(status: &str) -> OrderRow {
        OrderRow {
            id: 9,
            user_id: None,
            order_number: "ORD-00000009".into(),
            status: status.into(),
            total: Decimal::new(12_345, 2),
            shipping_address: Json(ShippingAddress {
                first_name: "Jean".into(),
                last_name: "Batten".into(),
                address: "9 Tasman St".into(),
                city: "Rotorua".into(),
                state: "BOP".into(),
                zip_code: "3010".into(),
                country: "New Zealand".into(),
                phone: Some("021 000 000".into()),
            }),
            payment_method: "paypal".into(),
            payment_status: "pending".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_row_conversion() {
        let order = Order::try_from(order_row("shipped")).unwrap();
        assert_eq!(order.id, OrderId::new(9));
        assert_eq!(order.info.status, OrderStatus::Shipped);
        assert_eq!(order.info.total, Price::from_cents(12_345));
    }

    #[test]
    fn test_unknown_status_is_corruption() {
        let err = Order::try_from(order_row("lost")).unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_negative_quantity_is_corruption() {
        let err = OrderItem::try_from(OrderItemRow {
            id: 1,
            order_id: 1,
            product_id: 1,
            name: "Cap".into(),
            price: Decimal::new(7_900, 2),
            quantity: -2,
            size: None,
            color: None,
            image_url: String::new(),
        })
        .unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }

    #[test]
    fn test_invalid_email_is_corruption() {
        let err = EmailSubscription::try_from(SubscriptionRow {
            id: 1,
            email: "broken".into(),
            source: "footer".into(),
            is_active: true,
            created_at: Utc::now(),
        })
        .unwrap_err();
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
