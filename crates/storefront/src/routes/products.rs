//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use aviator_core::{NewProduct, Price, Product, ProductId, ProductQuery, SortOption};

use crate::error::{AppError, FieldViolation, Result, ValidationFailure};
use crate::state::AppState;
use crate::validation::{MAX_PRICE, RequestSchema, ValidatedJson};

/// Query parameters accepted by the product listing.
///
/// Everything arrives as text so that malformed values are reported as field
/// errors in the usual JSON shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Comma-separated brand names.
    pub brand: Option<String>,
}

/// Trimmed, non-empty value.
fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_price(field: &str, raw: Option<&str>, errors: &mut Vec<FieldViolation>) -> Option<Price> {
    let raw = present(raw)?;
    match raw.parse::<f64>().ok().map(Price::from_f64) {
        Some(Ok(price)) => Some(price),
        _ => {
            errors.push(FieldViolation::new(
                field,
                "price",
                "must be a non-negative number",
            ));
            None
        }
    }
}

impl ProductListParams {
    /// The price, brand and sort part of the request, if any was given.
    fn refinement(&self) -> std::result::Result<Option<ProductQuery>, ValidationFailure> {
        let mut errors = Vec::new();
        let min_price = parse_price("minPrice", self.min_price.as_deref(), &mut errors);
        let max_price = parse_price("maxPrice", self.max_price.as_deref(), &mut errors);

        let sort = match present(self.sort.as_deref()) {
            None => None,
            Some(raw) => match raw.parse::<SortOption>() {
                Ok(sort) => Some(sort),
                Err(e) => {
                    errors.push(FieldViolation::new("sort", "sort", e.to_string()));
                    None
                }
            },
        };

        let brands: Vec<String> = present(self.brand.as_deref())
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|b| !b.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if !errors.is_empty() {
            return Err(ValidationFailure::new("Invalid product query", errors));
        }

        if min_price.is_none() && max_price.is_none() && sort.is_none() && brands.is_empty() {
            return Ok(None);
        }

        Ok(Some(ProductQuery {
            search: None,
            min_price,
            max_price,
            brands,
            colors: Vec::new(),
            sort: sort.unwrap_or_default(),
        }))
    }
}

/// List products.
///
/// `category` is an exact match. `search` is a case-insensitive substring
/// match over name, description and category; a blank term is ignored.
/// `minPrice`, `maxPrice`, `brand` and `sort` refine the result further.
/// Without `sort` products come back in catalog order.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<Vec<Product>>> {
    let refinement = params.refinement().map_err(AppError::Validation)?;

    let category = present(params.category.as_deref());
    let mut products = state.store().get_products(category).await?;

    if let Some(term) = present(params.search.as_deref()) {
        let needle = term.to_lowercase();
        products.retain(|p| p.matches_search(&needle));
    }

    if let Some(query) = refinement {
        products.retain(|p| query.matches(p));
        if present(params.sort.as_deref()).is_some() {
            query.sort.sort(&mut products);
        }
    }

    Ok(Json(products))
}

/// Featured products.
#[instrument(skip(state))]
pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.store().get_featured_products().await?))
}

/// Up to four products sharing the category of `id`. Unknown or malformed
/// ids have no related products.
#[instrument(skip(state))]
pub async fn related(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>> {
    let Ok(id) = id.parse::<ProductId>() else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.store().get_related_products(id).await?))
}

/// Single product. Malformed ids are treated like unknown ones.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    let not_found = || AppError::NotFound("Product not found".to_string());

    let id = id.parse::<ProductId>().map_err(|_| not_found())?;
    state
        .store()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// Body of `POST /api/products`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(required, length(min = 1))]
    pub name: Option<String>,
    #[validate(required)]
    pub description: Option<String>,
    #[validate(required, range(min = 0.0, max = MAX_PRICE))]
    pub price: Option<f64>,
    #[validate(required, length(min = 1))]
    pub image_url: Option<String>,
    #[validate(required, length(min = 1))]
    pub category: Option<String>,
    #[validate(required, length(min = 1))]
    pub brand: Option<String>,
    #[serde(default)]
    pub popularity: i32,
    pub available_sizes: Option<Vec<String>>,
    pub available_colors: Option<Vec<String>>,
    pub additional_images: Option<Vec<String>>,
    pub materials_care: Option<String>,
    pub details: Option<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    #[serde(default)]
    pub rating: f64,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub num_reviews: i32,
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub featured: bool,
}

impl RequestSchema for CreateProductRequest {
    const INVALID_MESSAGE: &'static str = "Invalid product data";
}

impl CreateProductRequest {
    fn into_new_product(self) -> std::result::Result<NewProduct, AppError> {
        let invalid = |field: &str, message: &str| {
            AppError::Validation(ValidationFailure::new(
                Self::INVALID_MESSAGE,
                vec![FieldViolation::new(field, "required", message)],
            ))
        };

        let price = self
            .price
            .ok_or_else(|| invalid("price", "is required"))
            .and_then(|p| Price::from_f64(p).map_err(|e| invalid("price", &e.to_string())))?;

        Ok(NewProduct {
            name: self.name.ok_or_else(|| invalid("name", "is required"))?,
            description: self
                .description
                .ok_or_else(|| invalid("description", "is required"))?,
            price,
            image_url: self
                .image_url
                .ok_or_else(|| invalid("imageUrl", "is required"))?,
            category: self
                .category
                .ok_or_else(|| invalid("category", "is required"))?,
            brand: self.brand.ok_or_else(|| invalid("brand", "is required"))?,
            popularity: self.popularity,
            available_sizes: self.available_sizes,
            available_colors: self.available_colors,
            additional_images: self.additional_images,
            materials_care: self.materials_care,
            details: self.details,
            rating: self.rating,
            num_reviews: self.num_reviews,
            in_stock: self.in_stock.unwrap_or(true),
            featured: self.featured,
        })
    }
}

/// Create a product.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state
        .store()
        .create_product(body.into_new_product()?)
        .await?;

    tracing::info!(product_id = %product.id, name = %product.info.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ProductListParams {
        let mut params = ProductListParams::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "sort" => params.sort = value,
                "minPrice" => params.min_price = value,
                "maxPrice" => params.max_price = value,
                "brand" => params.brand = value,
                _ => {}
            }
        }
        params
    }

    #[test]
    fn test_no_refinement_when_only_blank_values() {
        let refinement = params(&[("sort", " "), ("brand", "")]).refinement();
        assert!(matches!(refinement, Ok(None)));
    }

    #[test]
    fn test_refinement_parses_prices_and_brands() {
        let Ok(Some(query)) =
            params(&[("minPrice", "50"), ("brand", "AviatorX, Skyline")]).refinement()
        else {
            panic!("expected a refinement");
        };
        assert_eq!(query.min_price, Some(Price::from_whole(50)));
        assert_eq!(query.brands, ["AviatorX", "Skyline"]);
        assert_eq!(query.sort, SortOption::Featured);
    }

    #[test]
    fn test_bad_values_are_field_errors() {
        let Err(failure) = params(&[("minPrice", "cheap"), ("sort", "random")]).refinement()
        else {
            panic!("expected a validation failure");
        };
        assert!(failure.has_field("minPrice"));
        assert!(failure.has_field("sort"));
    }

    #[test]
    fn test_product_price_ceiling() {
        let request = |price: f64| -> CreateProductRequest {
            serde_json::from_value(serde_json::json!({
                "name": "Private Jet", "description": "Seats eight", "price": price,
                "imageUrl": "/jet.jpg", "category": "aircraft", "brand": "AviatorX"
            }))
            .unwrap()
        };

        let errors = crate::validation::flatten_errors(&request(1e9).validate().unwrap_err());
        assert_eq!(errors[0].field, "price");
        assert_eq!(errors[0].code, "range");
        assert!(request(MAX_PRICE).validate().is_ok());
    }
}
