//! Catalog listing, filtering and detail.

#![allow(clippy::unwrap_used)]

use aviator_integration_tests::{TestApp, error_fields};
use axum::http::StatusCode;
use serde_json::{Value, json};

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_returns_catalog_in_order() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/products").await;

    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 8);
    assert_eq!(products[0]["id"], 1);
    assert_eq!(products[0]["name"], "Vintage Aviator Bomber Jacket");
    assert_eq!(products[0]["price"], 299.0);
    assert!(!products[0]["imageUrl"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_category_filter_is_exact() {
    let app = TestApp::new().await;

    let (_, body) = app.get("/api/products?category=accessories").await;
    assert_eq!(names(&body), ["Vintage Pilot Leather Cap", "Aviator Sunglasses"]);

    let (_, body) = app.get("/api/products?category=Accessories").await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_is_case_insensitive_substring() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/products?search=JACKET").await;
    assert_eq!(status, StatusCode::OK);
    let found = names(&body);
    assert!(found.contains(&"Vintage Aviator Bomber Jacket"));
    assert!(found.contains(&"Women's Flight Jacket"));
    assert!(found.iter().all(|n| !n.contains("Sunglasses")));
}

#[tokio::test]
async fn test_blank_search_is_ignored() {
    let app = TestApp::new().await;
    let (_, body) = app.get("/api/products?search=%20%20").await;
    assert_eq!(body.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_price_sort_and_range() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get("/api/products?sort=price-low&minPrice=100&maxPrice=300")
        .await;
    assert_eq!(status, StatusCode::OK);

    let prices: Vec<f64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["price"].as_f64().unwrap())
        .collect();
    assert!(!prices.is_empty());
    assert!(prices.windows(2).all(|w| w[0] <= w[1]));
    assert!(prices.iter().all(|p| (100.0..=300.0).contains(p)));
}

#[tokio::test]
async fn test_bad_query_values_are_400() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/products?minPrice=cheap&sort=random").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid product query");
    let fields = error_fields(&body);
    assert!(fields.contains(&"minPrice".to_string()));
    assert!(fields.contains(&"sort".to_string()));
}

#[tokio::test]
async fn test_featured_products() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/products/featured").await;

    assert_eq!(status, StatusCode::OK);
    let featured = body.as_array().unwrap();
    assert_eq!(featured.len(), 7);
    assert!(featured.iter().all(|p| p["featured"] == true));
}

#[tokio::test]
async fn test_show_product() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/products/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Aviator Sunglasses");
    assert_eq!(body["category"], "accessories");
}

#[tokio::test]
async fn test_unknown_or_malformed_product_is_404() {
    let app = TestApp::new().await;

    for uri in ["/api/products/999", "/api/products/abc"] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["message"], "Product not found");
    }
}

#[tokio::test]
async fn test_related_products_share_category() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/products/related/1").await;
    assert_eq!(status, StatusCode::OK);
    let related = body.as_array().unwrap();
    assert!(!related.is_empty());
    assert!(related.len() <= 4);
    assert!(related.iter().all(|p| p["category"] == "mens" && p["id"] != 1));

    let (_, body) = app.get("/api/products/related/abc").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_product() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/products",
            &json!({
                "name": "Brass Flight Goggles",
                "description": "Tinted lenses with leather strap",
                "price": 89.5,
                "imageUrl": "/goggles.jpg",
                "category": "accessories",
                "brand": "AviatorX"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], 9);
    assert_eq!(body["inStock"], true);

    let (_, body) = app.get("/api/products/9").await;
    assert_eq!(body["name"], "Brass Flight Goggles");
}

#[tokio::test]
async fn test_create_product_reports_missing_fields() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post("/api/products", &json!({"name": "Nameless", "price": -1}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid product data");
    let fields = error_fields(&body);
    for field in ["description", "price", "imageUrl", "category", "brand"] {
        assert!(fields.contains(&field.to_string()), "missing {field}");
    }
}

#[tokio::test]
async fn test_create_product_rejects_price_above_ceiling() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/products",
            &json!({
                "name": "Private Jet",
                "description": "Seats eight",
                "price": 1e9,
                "imageUrl": "/jet.jpg",
                "category": "aircraft",
                "brand": "AviatorX"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), ["price"]);
    let (_, products) = app.get("/api/products").await;
    assert_eq!(products.as_array().unwrap().len(), 8);
}
