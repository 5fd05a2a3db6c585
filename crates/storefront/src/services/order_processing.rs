//! Simulated order processing.
//!
//! Stands in for the payment/inventory function a real deployment would
//! invoke: it waits a short random time and always approves.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::info;

/// Simulated processing latency bounds, in milliseconds.
const MIN_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 600;

/// Outcome of a processed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub success: bool,
    pub order_id: serde_json::Value,
    pub status: &'static str,
    pub message: &'static str,
    pub payment_status: &'static str,
    pub transaction_id: String,
    pub timestamp: DateTime<Utc>,
}

/// `TXN-<millis>-<4 random digits>`.
#[must_use]
pub fn transaction_id(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(1000..=9999);
    format!("TXN-{}-{suffix}", now.timestamp_millis())
}

/// Process an order after a random 100-600 ms delay.
pub async fn process_order(order_id: serde_json::Value) -> ProcessingResult {
    let delay = rand::rng().random_range(MIN_DELAY_MS..=MAX_DELAY_MS);
    tokio::time::sleep(Duration::from_millis(delay)).await;

    let now = Utc::now();
    let result = ProcessingResult {
        success: true,
        order_id,
        status: "processed",
        message: "Order processed successfully",
        payment_status: "approved",
        transaction_id: transaction_id(now),
        timestamp: now,
    };
    info!(
        transaction_id = %result.transaction_id,
        delay_ms = delay,
        "Order processed"
    );
    result
}
