//! Catalog product records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as stored in the catalog.
///
/// The `id` is assigned by the repository and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub info: NewProduct,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Attach an identifier and timestamps to a new product.
    #[must_use]
    pub const fn stamp(id: ProductId, info: NewProduct, at: DateTime<Utc>) -> Self {
        Self {
            id,
            info,
            created_at: at,
            updated_at: at,
        }
    }

    /// Whether `needle` (already lowercased) appears in the name, description
    /// or category of this product.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let d = &self.info;
        d.name.to_lowercase().contains(needle)
            || d.description.to_lowercase().contains(needle)
            || d.category.to_lowercase().contains(needle)
    }
}

/// Product fields supplied on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub image_url: String,
    pub category: String,
    pub brand: String,
    #[serde(default)]
    pub popularity: i32,
    #[serde(default)]
    pub available_sizes: Option<Vec<String>>,
    #[serde(default)]
    pub available_colors: Option<Vec<String>>,
    #[serde(default)]
    pub additional_images: Option<Vec<String>>,
    #[serde(default)]
    pub materials_care: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: i32,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
}

const fn default_in_stock() -> bool {
    true
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::product;
    use super::*;

    #[test]
    fn test_json_shape_is_flat_camel_case() {
        let json = serde_json::to_value(product(3, "Aviator Sunglasses", "accessories", 12900))
            .unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["name"], "Aviator Sunglasses");
        assert_eq!(json["imageUrl"], "https://img.example.com/3.jpg");
        assert_eq!(json["inStock"], true);
        assert!(json["availableSizes"].is_null());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("details").is_some());
    }

    #[test]
    fn test_new_product_defaults() {
        let new: NewProduct = serde_json::from_value(serde_json::json!({
            "name": "Cap",
            "description": "Leather cap",
            "price": 79.0,
            "imageUrl": "cap.jpg",
            "category": "accessories",
            "brand": "AviatorX"
        }))
        .unwrap();
        assert!(new.in_stock);
        assert!(!new.featured);
        assert_eq!(new.popularity, 0);
    }

    #[test]
    fn test_matches_search_is_case_insensitive_over_three_fields() {
        let p = product(1, "Flight Jacket", "womens", 24900);
        assert!(p.matches_search("flight"));
        assert!(p.matches_search("description"));
        assert!(p.matches_search("womens"));
        assert!(!p.matches_search("sunglasses"));
    }
}
