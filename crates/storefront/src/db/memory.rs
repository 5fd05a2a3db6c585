//! In-memory repositories.
//!
//! Each table is a `BTreeMap` keyed by its sequential id, so iteration order
//! is creation order. A single `RwLock` guards all tables and counters, which
//! makes id assignment and the uniqueness checks atomic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use aviator_core::{
    Email, EmailSubscription, NewEmailSubscription, NewOrder, NewOrderItem, NewProduct, Order,
    OrderId, OrderItem, OrderItemId, Product, ProductId, SubscriptionId,
};

use super::{CatalogRepository, OrderRepository, RepositoryError, Store, SubscriptionRepository};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    order_items: BTreeMap<OrderItemId, OrderItem>,
    subscriptions: BTreeMap<SubscriptionId, EmailSubscription>,
    next_product_id: i32,
    next_order_id: i32,
    next_order_item_id: i32,
    next_subscription_id: i32,
}

/// Advance `counter` and return the new value. Ids start at 1.
fn take_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

impl Tables {
    fn insert_order(&mut self, order: NewOrder) -> Result<Order, RepositoryError> {
        if self
            .orders
            .values()
            .any(|existing| existing.info.order_number == order.order_number)
        {
            return Err(RepositoryError::Conflict(format!(
                "order number {} already exists",
                order.order_number
            )));
        }

        let id = OrderId::new(take_id(&mut self.next_order_id));
        let stored = Order::stamp(id, order, Utc::now());
        self.orders.insert(id, stored.clone());
        Ok(stored)
    }

    fn insert_order_item(&mut self, item: NewOrderItem) -> OrderItem {
        let id = OrderItemId::new(take_id(&mut self.next_order_item_id));
        let stored = OrderItem { id, info: item };
        self.order_items.insert(id, stored.clone());
        stored
    }
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn get_products(&self, category: Option<&str>) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| category.is_none_or(|c| p.info.category == c))
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.tables.read().await.products.get(&id).cloned())
    }

    async fn get_featured_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.info.featured)
            .cloned()
            .collect())
    }

    async fn insert_product(
        &self,
        product: NewProduct,
        created_at: DateTime<Utc>,
    ) -> Result<Product, RepositoryError> {
        let mut tables = self.tables.write().await;
        let id = ProductId::new(take_id(&mut tables.next_product_id));
        let stored = Product::stamp(id, product, created_at);
        tables.products.insert(id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn create_order(&self, order: NewOrder) -> Result<Order, RepositoryError> {
        self.tables.write().await.insert_order(order)
    }

    async fn get_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(self.tables.read().await.orders.values().cloned().collect())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn create_order_item(&self, item: NewOrderItem) -> Result<OrderItem, RepositoryError> {
        Ok(self.tables.write().await.insert_order_item(item))
    }

    async fn create_order_with_items(
        &self,
        order: NewOrder,
        items: Vec<NewOrderItem>,
    ) -> Result<(Order, Vec<OrderItem>), RepositoryError> {
        let mut tables = self.tables.write().await;
        let order = tables.insert_order(order)?;
        let items = items
            .into_iter()
            .map(|item| {
                tables.insert_order_item(NewOrderItem {
                    order_id: order.id,
                    ..item
                })
            })
            .collect();
        Ok((order, items))
    }

    async fn get_order_items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .order_items
            .values()
            .filter(|item| item.info.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn get_email_subscription(
        &self,
        email: &Email,
    ) -> Result<Option<EmailSubscription>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .subscriptions
            .values()
            .find(|s| &s.info.email == email)
            .cloned())
    }

    async fn create_email_subscription(
        &self,
        subscription: NewEmailSubscription,
    ) -> Result<EmailSubscription, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables
            .subscriptions
            .values()
            .any(|s| s.info.email == subscription.email)
        {
            return Err(RepositoryError::Conflict(format!(
                "{} is already subscribed",
                subscription.email
            )));
        }

        let id = SubscriptionId::new(take_id(&mut tables.next_subscription_id));
        let stored = EmailSubscription {
            id,
            info: subscription,
            created_at: Utc::now(),
        };
        tables.subscriptions.insert(id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
