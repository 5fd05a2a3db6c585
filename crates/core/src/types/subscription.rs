//! Newsletter subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::SubscriptionId;

/// Subscription fields supplied on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmailSubscription {
    pub email: Email,
    /// Where the address was collected, e.g. `footer` or `exit-popup`.
    pub source: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// A stored subscription. Email addresses are unique across subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSubscription {
    pub id: SubscriptionId,
    #[serde(flatten)]
    pub info: NewEmailSubscription,
    pub created_at: DateTime<Utc>,
}
