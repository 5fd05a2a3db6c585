//! Shopping cart state.
//!
//! The cart is a flat list of line items owned by a single browser session.
//! Every mutation writes the whole list back to a [`KeyValueStorage`] mirror
//! under [`CART_STORAGE_KEY`], and [`CartStore::load`] rehydrates it once at
//! start-up. Totals are folded from the items on demand and never stored.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::Price;

/// Key the cart is mirrored under.
pub const CART_STORAGE_KEY: &str = "cart";

/// Orders with a subtotal above this ship for free.
pub const FREE_SHIPPING_THRESHOLD: Price = Price::from_whole(100);

/// Flat shipping fee below the free shipping threshold.
pub const FLAT_SHIPPING: Price = Price::from_whole(15);

/// Sales tax applied to the subtotal (8%).
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Errors raised by cart mutations.
#[derive(thiserror::Error, Debug)]
pub enum CartError {
    /// Line items must carry at least one unit.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    /// The mirror could not be written.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] io::Error),
    /// The item list could not be encoded.
    #[error("failed to encode cart: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One product/variant combination in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Catalog product identifier, kept as the string the client uses.
    pub id: String,
    pub name: String,
    pub price: Price,
    pub image_url: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CartLineItem {
    /// Whether `other` describes the same product variant.
    #[must_use]
    pub fn same_variant(&self, other: &Self) -> bool {
        self.id == other.id && self.size == other.size && self.color == other.color
    }

    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// String key/value storage with browser `localStorage` semantics.
pub trait KeyValueStorage {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// In-process storage. Clones share the same map, so a test can keep a
/// handle and inspect what the cart wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current raw value under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Shipping, tax and total derived from a cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

impl CheckoutSummary {
    #[must_use]
    pub fn from_subtotal(subtotal: Price) -> Self {
        let shipping = if subtotal > FREE_SHIPPING_THRESHOLD {
            Price::ZERO
        } else {
            FLAT_SHIPPING
        };
        let tax = subtotal.scaled(TAX_RATE);
        Self {
            subtotal,
            shipping,
            tax,
            total: (subtotal + shipping + tax).rounded(),
        }
    }
}

/// The cart reducer bound to its storage mirror.
#[derive(Debug)]
pub struct CartStore<S> {
    items: Vec<CartLineItem>,
    storage: S,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Rehydrate the cart from `storage`.
    ///
    /// A missing mirror yields an empty cart. So does an unreadable or
    /// corrupt one, after logging a warning.
    pub fn load(storage: S) -> Self {
        let items = match storage.get_item(CART_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unparseable cart mirror");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cart mirror");
                Vec::new()
            }
        };
        Self { items, storage }
    }

    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line items, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    #[must_use]
    pub fn checkout_summary(&self) -> CheckoutSummary {
        CheckoutSummary::from_subtotal(self.subtotal())
    }

    /// Add `item`, merging into an existing line with the same product,
    /// size and color.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity, or a
    /// storage error if the mirror cannot be written.
    pub fn add_item(&mut self, item: CartLineItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        match self.items.iter_mut().find(|line| line.same_variant(&item)) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
        self.persist()
    }

    /// Drop every line for product `id`, whatever its variant.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be written.
    pub fn remove_item(&mut self, id: &str) -> Result<(), CartError> {
        self.items.retain(|line| line.id != id);
        self.persist()
    }

    /// Add one unit to the first line for product `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be written.
    pub fn increment_item(&mut self, id: &str) -> Result<(), CartError> {
        if let Some(line) = self.first_line_mut(id) {
            line.quantity = line.quantity.saturating_add(1);
            self.persist()?;
        }
        Ok(())
    }

    /// Remove one unit from the first line for product `id`. A line with a
    /// single unit is left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be written.
    pub fn decrement_item(&mut self, id: &str) -> Result<(), CartError> {
        if let Some(line) = self.first_line_mut(id)
            && line.quantity > 1
        {
            line.quantity -= 1;
            self.persist()?;
        }
        Ok(())
    }

    /// Set the quantity of the first line for product `id`, clamped to 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be written.
    pub fn update_item_quantity(&mut self, id: &str, quantity: u32) -> Result<(), CartError> {
        if let Some(line) = self.first_line_mut(id) {
            line.quantity = quantity.max(1);
            self.persist()?;
        }
        Ok(())
    }

    /// Empty the cart and its mirror.
    ///
    /// # Errors
    ///
    /// Returns an error if the mirror cannot be written.
    pub fn clear_cart(&mut self) -> Result<(), CartError> {
        self.items.clear();
        self.persist()
    }

    /// Give back the storage handle.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn first_line_mut(&mut self, id: &str) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|line| line.id == id)
    }

    fn persist(&mut self) -> Result<(), CartError> {
        let raw = serde_json::to_string(&self.items)?;
        self.storage.set_item(CART_STORAGE_KEY, &raw)?;
        Ok(())
    }
}
