//! Newsletter sign-up.

#![allow(clippy::unwrap_used)]

use aviator_core::Email;
use aviator_integration_tests::{FakeCloud, TestApp, error_fields, test_config};
use aviator_storefront::db::SubscriptionRepository;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_subscribe_returns_discount_code() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/subscribe",
            &json!({"email": "pilot@example.com", "source": "footer"}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Successfully subscribed");
    assert_eq!(body["discountCode"], "ADVENTURE15");

    let email = Email::parse("pilot@example.com").unwrap();
    let stored = app.store.get_email_subscription(&email).await.unwrap().unwrap();
    assert_eq!(stored.info.source, "footer");
    assert!(stored.info.is_active);
}

#[tokio::test]
async fn test_duplicate_subscription_still_succeeds() {
    let app = TestApp::new().await;
    let body = json!({"email": "pilot@example.com", "source": "exit-popup"});

    let (first, _) = app.post("/api/subscribe", &body).await;
    let (second, response) = app.post("/api/subscribe", &body).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CREATED);
    assert_eq!(response["discountCode"], "ADVENTURE15");
}

#[tokio::test]
async fn test_invalid_email_is_400() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/subscribe",
            &json!({"email": "not-an-email", "source": "footer"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email");
    assert_eq!(error_fields(&body), ["email"]);
}

#[tokio::test]
async fn test_missing_source_is_400() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post("/api/subscribe", &json!({"email": "pilot@example.com"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), ["source"]);
}

#[tokio::test]
async fn test_discount_code_is_configurable() {
    let config = test_config(&[("STOREFRONT_DISCOUNT_CODE", "TAKEOFF10")]);
    let app = TestApp::with(config, FakeCloud::new()).await;

    let (_, body) = app
        .post(
            "/api/subscribe",
            &json!({"email": "pilot@example.com", "source": "footer"}),
        )
        .await;
    assert_eq!(body["discountCode"], "TAKEOFF10");
}
