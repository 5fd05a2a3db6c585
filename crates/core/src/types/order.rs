//! Order and order line item records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, OrderItemId, ProductId, UserId};
use super::price::Price;
use super::status::{OrderStatus, PaymentStatus};

/// Where an order ships to. Stored as a single structured value on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Order fields supplied on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    pub total: Price,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(default)]
    pub payment_status: PaymentStatus,
}

/// A stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(flatten)]
    pub info: NewOrder,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub const fn stamp(id: OrderId, info: NewOrder, at: DateTime<Utc>) -> Self {
        Self {
            id,
            info,
            created_at: at,
            updated_at: at,
        }
    }

    #[must_use]
    pub fn order_number(&self) -> &str {
        &self.info.order_number
    }
}

/// Line item captured at purchase time.
///
/// Name, price and image are copied from the cart and catalog so the item
/// keeps describing what was bought even if the product changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: String,
}

impl NewOrderItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A stored order line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(flatten)]
    pub info: NewOrderItem,
}

/// An order together with its line items, as returned by the order routes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
