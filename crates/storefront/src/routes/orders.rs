//! Checkout and order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use aviator_core::{
    NewOrder, NewOrderItem, OrderId, OrderStatus, OrderWithItems, PaymentStatus, Price, ProductId,
    ShippingAddress,
};

use crate::db::Store;
use crate::error::{AppError, FieldViolation, Result, ValidationFailure, add_breadcrumb};
use crate::services::order_processing::{self, ProcessingResult};
use crate::state::AppState;
use crate::validation::{MAX_PRICE, RequestSchema, ValidatedJson};

/// Largest quantity accepted on a single line.
const MAX_LINE_QUANTITY: i64 = 10_000;

/// Who is buying and where it ships.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    #[validate(required, length(min = 1))]
    pub first_name: Option<String>,
    #[validate(required, length(min = 1))]
    pub last_name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(required, length(min = 1))]
    pub address: Option<String>,
    #[validate(required, length(min = 1))]
    pub city: Option<String>,
    #[validate(required, length(min = 1))]
    pub state: Option<String>,
    #[validate(required, length(min = 1))]
    pub zip_code: Option<String>,
    #[validate(required, length(min = 1))]
    pub country: Option<String>,
}

/// One cart line as submitted at checkout.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Catalog id as a string, the way the cart stores it.
    #[validate(required, length(min = 1))]
    pub product_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required, range(min = 0.0, max = MAX_PRICE))]
    pub price: Option<f64>,
    #[validate(required, range(min = 1, max = MAX_LINE_QUANTITY))]
    pub quantity: Option<i64>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// Payment method and the amounts the client computed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[validate(required, length(min = 1))]
    pub method: Option<String>,
    #[validate(required, range(min = 0.0, max = MAX_PRICE))]
    pub total: Option<f64>,
    #[validate(required, range(min = 0.0, max = MAX_PRICE))]
    pub subtotal: Option<f64>,
    #[validate(required, range(min = 0.0, max = MAX_PRICE))]
    pub shipping: Option<f64>,
    #[validate(required, range(min = 0.0, max = MAX_PRICE))]
    pub tax: Option<f64>,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(nested)]
    #[serde(default)]
    pub customer: CustomerDetails,
    #[validate(length(min = 1), nested)]
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[validate(nested)]
    #[serde(default)]
    pub payment: PaymentDetails,
}

impl RequestSchema for CreateOrderRequest {
    const INVALID_MESSAGE: &'static str = "Invalid order data";
}

/// A validated line, ready to be stored.
#[derive(Debug)]
struct CheckedLine {
    product_id: ProductId,
    name: String,
    price: Price,
    quantity: u32,
    size: Option<String>,
    color: Option<String>,
}

/// A validated order, ready to be stored.
#[derive(Debug)]
struct CheckedOrder {
    shipping_address: ShippingAddress,
    payment_method: String,
    total: Price,
    lines: Vec<CheckedLine>,
}

/// Collects violations found after the declarative rules passed.
struct Checker {
    errors: Vec<FieldViolation>,
}

impl Checker {
    fn text(&mut self, field: &str, value: Option<String>) -> String {
        value.unwrap_or_else(|| {
            self.errors
                .push(FieldViolation::new(field, "required", "is required"));
            String::new()
        })
    }

    fn price(&mut self, field: &str, value: Option<f64>) -> Price {
        match value.map(Price::from_f64) {
            Some(Ok(price)) => price,
            Some(Err(e)) => {
                self.errors
                    .push(FieldViolation::new(field, "price", e.to_string()));
                Price::ZERO
            }
            None => {
                self.errors
                    .push(FieldViolation::new(field, "required", "is required"));
                Price::ZERO
            }
        }
    }

    fn quantity(&mut self, field: &str, value: Option<i64>) -> u32 {
        value
            .and_then(|q| u32::try_from(q).ok())
            .filter(|q| *q > 0)
            .unwrap_or_else(|| {
                self.errors
                    .push(FieldViolation::new(field, "range", "must be a positive integer"));
                1
            })
    }

    fn product_id(&mut self, field: &str, value: Option<&str>) -> ProductId {
        value
            .and_then(|raw| raw.trim().parse::<ProductId>().ok())
            .unwrap_or_else(|| {
                self.errors.push(FieldViolation::new(
                    field,
                    "integer",
                    "must be a numeric product id",
                ));
                ProductId::new(0)
            })
    }
}

impl CreateOrderRequest {
    /// Convert to storable values, reporting anything the declarative rules
    /// cannot express (numeric product ids, representable prices).
    fn check(self) -> std::result::Result<CheckedOrder, ValidationFailure> {
        let mut checker = Checker { errors: Vec::new() };
        let customer = self.customer;

        let shipping_address = ShippingAddress {
            first_name: checker.text("customer.firstName", customer.first_name),
            last_name: checker.text("customer.lastName", customer.last_name),
            address: checker.text("customer.address", customer.address),
            city: checker.text("customer.city", customer.city),
            state: checker.text("customer.state", customer.state),
            zip_code: checker.text("customer.zipCode", customer.zip_code),
            country: checker.text("customer.country", customer.country),
            phone: customer.phone,
        };

        let payment_method = checker.text("payment.method", self.payment.method);
        let total = checker.price("payment.total", self.payment.total);

        let lines: Vec<CheckedLine> = self
            .items
            .into_iter()
            .enumerate()
            .map(|(i, line)| CheckedLine {
                product_id: checker.product_id(
                    &format!("items[{i}].productId"),
                    line.product_id.as_deref(),
                ),
                name: checker.text(&format!("items[{i}].name"), line.name),
                price: checker.price(&format!("items[{i}].price"), line.price),
                quantity: checker.quantity(&format!("items[{i}].quantity"), line.quantity),
                size: line.size,
                color: line.color,
            })
            .collect();

        if !checker.errors.is_empty() {
            return Err(ValidationFailure::new(Self::INVALID_MESSAGE, checker.errors));
        }

        Ok(CheckedOrder {
            shipping_address,
            payment_method,
            total,
            lines,
        })
    }
}

/// Create an order and its line items.
///
/// Each item snapshots the catalog image of its product when the product
/// exists. The order and its items are stored together, so a failed write
/// leaves no partial order behind. Responds with the stored order and items.
#[instrument(skip(state, body), fields(items = body.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderWithItems>)> {
    let checked = body.check().map_err(AppError::Validation)?;
    let store = state.store();

    let mut new_items = Vec::with_capacity(checked.lines.len());
    for line in checked.lines {
        let image_url = store
            .get_product(line.product_id)
            .await?
            .map(|product| product.info.image_url)
            .unwrap_or_default();

        new_items.push(NewOrderItem {
            // Assigned by the store once the order exists.
            order_id: OrderId::new(0),
            product_id: line.product_id,
            name: line.name,
            price: line.price,
            quantity: line.quantity,
            size: line.size,
            color: line.color,
            image_url,
        });
    }

    let (order, items) = store
        .create_order_with_items(
            NewOrder {
                user_id: None,
                order_number: state.order_numbers().next(),
                status: OrderStatus::Pending,
                total: checked.total,
                shipping_address: checked.shipping_address,
                payment_method: checked.payment_method,
                payment_status: PaymentStatus::Pending,
            },
            new_items,
        )
        .await?;

    add_breadcrumb(
        "checkout",
        "Order created",
        Some([("order_number", order.order_number())].as_slice()),
    );
    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number(),
        items = items.len(),
        total = %order.info.total,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(OrderWithItems { order, items })))
}

async fn with_items(
    store: &dyn Store,
    order: aviator_core::Order,
) -> std::result::Result<OrderWithItems, AppError> {
    let items = store.get_order_items(order.id).await?;
    Ok(OrderWithItems { order, items })
}

/// All orders with their items, in creation order.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<OrderWithItems>>> {
    let store = state.store();
    let orders = store.get_orders().await?;

    let mut out = Vec::with_capacity(orders.len());
    for order in orders {
        out.push(with_items(store, order).await?);
    }
    Ok(Json(out))
}

/// Single order with its items.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderWithItems>> {
    let not_found = || AppError::NotFound("Order not found".to_string());

    let id = id.parse::<OrderId>().map_err(|_| not_found())?;
    let order = state.store().get_order(id).await?.ok_or_else(not_found)?;
    Ok(Json(with_items(state.store(), order).await?))
}

/// Body of `POST /api/orders/process`. Contents are passed through untouched.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOrderRequest {
    #[validate(required)]
    pub order_id: Option<serde_json::Value>,
    #[validate(required)]
    pub items: Option<serde_json::Value>,
    #[validate(required)]
    pub customer_info: Option<serde_json::Value>,
    pub payment_info: Option<serde_json::Value>,
}

impl RequestSchema for ProcessOrderRequest {
    const INVALID_MESSAGE: &'static str = "Incomplete order data";
}

/// Run the simulated payment step for an order.
#[instrument(skip(body))]
pub async fn process(
    ValidatedJson(body): ValidatedJson<ProcessOrderRequest>,
) -> Result<Json<ProcessingResult>> {
    let order_id = body.order_id.unwrap_or_default();
    Ok(Json(order_processing::process_order(order_id).await))
}
