//! Health checks, response middleware and static client serving.

#![allow(clippy::unwrap_used)]

use aviator_integration_tests::{FakeCloud, TestApp, get, test_config};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};

#[tokio::test]
async fn test_liveness_and_readiness() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".to_string()));

    let (status, _) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_api_responses_carry_security_headers() {
    let app = TestApp::new().await;
    let (_, headers, _) = app.send(get("/api/products")).await;

    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["cache-control"], "no-store, max-age=0");
    assert!(headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_request_id_is_generated_or_echoed() {
    let app = TestApp::new().await;

    let (_, headers, _) = app.send(get("/health")).await;
    assert!(!headers["x-request-id"].is_empty());

    let request = Request::get("/health")
        .header("x-request-id", "edge-1234")
        .body(axum::body::Body::empty())
        .unwrap();
    let (_, headers, _) = app.send(request).await;
    assert_eq!(headers["x-request-id"], "edge-1234");
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Not found"}));
}

#[tokio::test]
async fn test_cors_preflight_for_configured_origin() {
    let config = test_config(&[("STOREFRONT_ALLOWED_ORIGIN", "https://shop.aviatorx.test")]);
    let app = TestApp::with(config, FakeCloud::new()).await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/orders")
        .header(header::ORIGIN, "https://shop.aviatorx.test")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, headers, _) = app.send(request).await;

    assert!(status.is_success());
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://shop.aviatorx.test"
    );
}

#[tokio::test]
async fn test_static_dir_serves_client_with_spa_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<html>aviator</html>").unwrap();
    std::fs::write(dir.path().join("app.js"), "console.log(1)").unwrap();

    let config = test_config(&[("STOREFRONT_STATIC_DIR", dir.path().to_str().unwrap())]);
    let app = TestApp::with(config, FakeCloud::new()).await;

    let (status, body) = app.get("/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("console.log(1)".to_string()));

    // Client-side routes get the bundle entry point
    let (status, body) = app.get("/products/7").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("<html>aviator</html>".to_string()));

    let (status, body) = app.get("/api/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
}
