//! Aviator Store core library.
//!
//! Shared by every Aviator Store component:
//! - `storefront` - REST API and client bundle host
//! - `cli` - migrations, catalog seeding and a terminal cart
//!
//! # Architecture
//!
//! The core crate holds domain types and the client-side state machines
//! (cart, overlay visibility, catalog filtering). It performs no network or
//! database I/O; the cart writes only to whatever [`cart::KeyValueStorage`]
//! it is handed.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, emails, statuses and the stored records
//! - [`cart`] - Cart Store and checkout totals
//! - [`ui`] - overlay panel visibility
//! - [`catalog`] - product list filtering and sorting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;
pub mod ui;

pub use cart::{CartError, CartLineItem, CartStore, CheckoutSummary, KeyValueStorage, MemoryStorage};
pub use catalog::{CatalogFacets, ProductQuery, SortOption};
pub use types::*;
pub use ui::UiState;
