//! Terminal cart backed by a JSON file mirror.
//!
//! # Usage
//!
//! ```bash
//! aviator-cli cart add 7 --quantity 2
//! aviator-cli cart decrement 7
//! aviator-cli cart show --dir /tmp/cart
//! ```

use std::path::Path;

use serde_json::json;

use aviator_core::{CartError, CartLineItem, CartStore};
use aviator_storefront::db::seed::SeedProduct;

use crate::storage::FileStorage;

#[derive(Debug, thiserror::Error)]
pub enum CartCommandError {
    #[error("no product with id {0} in the catalog")]
    UnknownProduct(u32),

    #[error("{product} is not available in {option} {value:?}")]
    UnavailableOption {
        product: String,
        option: &'static str,
        value: String,
    },

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("failed to render cart: {0}")]
    Render(#[from] serde_json::Error),
}

/// Load the cart mirrored under `dir`.
pub fn open(dir: &Path) -> CartStore<FileStorage> {
    CartStore::load(FileStorage::new(dir))
}

fn check_option(
    product: &str,
    option: &'static str,
    choice: Option<&String>,
    available: Option<&Vec<String>>,
) -> Result<(), CartCommandError> {
    if let (Some(choice), Some(available)) = (choice, available)
        && !available.contains(choice)
    {
        return Err(CartCommandError::UnavailableOption {
            product: product.to_string(),
            option,
            value: choice.clone(),
        });
    }
    Ok(())
}

/// Build a line item for catalog product `product_id`.
///
/// Ids follow catalog order starting at 1, the same numbering a freshly
/// seeded store assigns. A size or color must be one the product offers
/// when the product lists any.
///
/// # Errors
///
/// Returns `CartCommandError` for an unknown id or an unavailable variant.
pub fn line_item(
    catalog: &[SeedProduct],
    product_id: u32,
    quantity: u32,
    size: Option<String>,
    color: Option<String>,
) -> Result<CartLineItem, CartCommandError> {
    let index = usize::try_from(product_id)
        .ok()
        .and_then(|id| id.checked_sub(1))
        .ok_or(CartCommandError::UnknownProduct(product_id))?;
    let product = &catalog
        .get(index)
        .ok_or(CartCommandError::UnknownProduct(product_id))?
        .product;

    check_option(
        &product.name,
        "size",
        size.as_ref(),
        product.available_sizes.as_ref(),
    )?;
    check_option(
        &product.name,
        "color",
        color.as_ref(),
        product.available_colors.as_ref(),
    )?;

    Ok(CartLineItem {
        id: product_id.to_string(),
        name: product.name.clone(),
        price: product.price,
        image_url: product.image_url.clone(),
        quantity,
        size,
        color,
    })
}

/// Print the cart and its checkout summary as JSON.
///
/// # Errors
///
/// Returns an error if the cart cannot be encoded.
pub fn show(cart: &CartStore<FileStorage>) -> Result<(), CartCommandError> {
    let rendered = serde_json::to_string_pretty(&json!({
        "items": cart.items(),
        "itemCount": cart.item_count(),
        "summary": cart.checkout_summary(),
    }))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }
    Ok(())
}
