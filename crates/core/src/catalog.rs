//! Product list filtering and sorting used by the catalog pages.
//!
//! Filters combine with AND. Within the brand and color filters any single
//! match is enough. Sorting is stable, so products that compare equal keep
//! the order the repository returned them in.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Price, Product};

/// Ordering applied to a product list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Most popular first.
    #[default]
    Featured,
    /// Most recently created first.
    Newest,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
}

impl SortOption {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
        }
    }

    /// Sort `products` in place.
    pub fn sort(self, products: &mut [Product]) {
        match self {
            Self::Featured => products.sort_by_key(|p| Reverse(p.info.popularity)),
            Self::Newest => products.sort_by_key(|p| Reverse(p.created_at)),
            Self::PriceLow => products.sort_by_key(|p| p.info.price),
            Self::PriceHigh => products.sort_by_key(|p| Reverse(p.info.price)),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown sort option name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort option: {0}")]
pub struct UnknownSortOption(pub String);

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Featured, Self::Newest, Self::PriceLow, Self::PriceHigh]
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| UnknownSortOption(s.to_string()))
    }
}

/// Filters and ordering for a product list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring of the name or description.
    pub search: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    /// Accepted brands. Empty accepts all.
    pub brands: Vec<String>,
    /// Accepted colors. Empty accepts all.
    pub colors: Vec<String>,
    pub sort: SortOption,
}

impl ProductQuery {
    /// Whether `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let info = &product.info;

        if let Some(term) = self.search.as_deref().map(str::trim)
            && !term.is_empty()
        {
            let needle = term.to_lowercase();
            if !info.name.to_lowercase().contains(&needle)
                && !info.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if self.min_price.is_some_and(|min| info.price < min)
            || self.max_price.is_some_and(|max| info.price > max)
        {
            return false;
        }

        if !self.brands.is_empty() && !self.brands.contains(&info.brand) {
            return false;
        }

        if !self.colors.is_empty() {
            let offered = info.available_colors.as_deref().unwrap_or_default();
            if !offered.iter().any(|color| self.colors.contains(color)) {
                return false;
            }
        }

        true
    }

    /// Filter then sort.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut kept: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        self.sort.sort(&mut kept);
        kept
    }
}

/// Filter choices offered for a product list: every brand and color that
/// appears, sorted and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogFacets {
    pub brands: Vec<String>,
    pub colors: Vec<String>,
}

impl CatalogFacets {
    #[must_use]
    pub fn collect(products: &[Product]) -> Self {
        let brands: BTreeSet<&str> = products.iter().map(|p| p.info.brand.as_str()).collect();
        let colors: BTreeSet<&str> = products
            .iter()
            .flat_map(|p| p.info.available_colors.iter().flatten())
            .map(String::as_str)
            .collect();
        Self {
            brands: brands.into_iter().map(str::to_string).collect(),
            colors: colors.into_iter().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::product::fixtures::product;

    fn catalog() -> Vec<Product> {
        let mut jacket = product(1, "Bomber Jacket", "mens", 29_900);
        jacket.info.popularity = 95;
        jacket.info.available_colors = Some(vec!["Brown".into(), "Black".into()]);
        let mut shirt = product(2, "Navigator Shirt", "mens", 8_900);
        shirt.info.popularity = 85;
        shirt.info.available_colors = Some(vec!["White".into()]);
        let mut cap = product(3, "Pilot Leather Cap", "accessories", 7_900);
        cap.info.popularity = 70;
        cap.info.brand = "SkyGear".into();
        vec![jacket, shirt, cap]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.info.name.as_str()).collect()
    }

    #[test]
    fn test_default_query_sorts_by_popularity() {
        let sorted = ProductQuery::default().apply(catalog());
        assert_eq!(
            names(&sorted),
            ["Bomber Jacket", "Navigator Shirt", "Pilot Leather Cap"]
        );
    }

    #[test]
    fn test_search_covers_name_and_description_only() {
        let query = ProductQuery {
            search: Some("  NAVIGATOR ".into()),
            ..ProductQuery::default()
        };
        assert_eq!(names(&query.apply(catalog())), ["Navigator Shirt"]);

        let by_category = ProductQuery {
            search: Some("mens".into()),
            ..ProductQuery::default()
        };
        assert!(by_category.apply(catalog()).is_empty());
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let query = ProductQuery {
            min_price: Some(Price::from_cents(7_900)),
            max_price: Some(Price::from_cents(8_900)),
            sort: SortOption::PriceHigh,
            ..ProductQuery::default()
        };
        assert_eq!(
            names(&query.apply(catalog())),
            ["Navigator Shirt", "Pilot Leather Cap"]
        );
    }

    #[test]
    fn test_brand_and_color_filters() {
        let query = ProductQuery {
            brands: vec!["AviatorX".into()],
            colors: vec!["Black".into(), "Olive".into()],
            ..ProductQuery::default()
        };
        assert_eq!(names(&query.apply(catalog())), ["Bomber Jacket"]);
    }

    #[test]
    fn test_newest_and_price_low() {
        let newest = ProductQuery {
            sort: SortOption::Newest,
            ..ProductQuery::default()
        };
        assert_eq!(names(&newest.apply(catalog()))[0], "Pilot Leather Cap");

        let cheapest = ProductQuery {
            sort: SortOption::PriceLow,
            ..ProductQuery::default()
        };
        assert_eq!(names(&cheapest.apply(catalog()))[0], "Pilot Leather Cap");
    }

    #[test]
    fn test_sort_option_parse() {
        assert_eq!("price-low".parse::<SortOption>().unwrap(), SortOption::PriceLow);
        assert!("cheapest".parse::<SortOption>().is_err());
    }

    #[test]
    fn test_facets_are_sorted_and_unique() {
        let facets = CatalogFacets::collect(&catalog());
        assert_eq!(facets.brands, ["AviatorX", "SkyGear"]);
        assert_eq!(facets.colors, ["Black", "Brown", "White"]);
    }
}
