//! Cloud admin endpoints against the fake cloud.

#![allow(clippy::unwrap_used)]

use aviator_integration_tests::{FakeCloud, TestApp, error_fields, test_config};
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

const BOUNDARY: &str = "aviator-test-boundary";

fn multipart(field: &str, file_name: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::post("/api/aws/s3/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_config_reports_credentials() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/api/aws/config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"configured": false, "region": "us-east-1"}));

    let config = test_config(&[
        ("AWS_REGION", "eu-west-1"),
        ("AWS_ACCESS_KEY_ID", "AKIAEXAMPLEKEY123456"),
        ("AWS_SECRET_ACCESS_KEY", "q8Zt3vL1xN0pR7mK2sY5wB9cF4hJ6dG0aE3uT1iO"),
    ]);
    let app = TestApp::with(config, FakeCloud::new()).await;
    let (_, body) = app.get("/api/aws/config").await;
    assert_eq!(body, json!({"configured": true, "region": "eu-west-1"}));
}

#[tokio::test]
async fn test_upload_list_delete() {
    let app = TestApp::new().await;

    let (status, _, body) = app.send(multipart("file", "manifest.txt", "hello")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "File uploaded successfully");

    let key = body["fileKey"].as_str().unwrap().to_string();
    assert!(key.starts_with("uploads/"));
    assert!(key.ends_with("-manifest.txt"));
    assert!(body["fileUrl"].as_str().unwrap().ends_with(&key));
    assert_eq!(app.cloud.log().objects[&key].0, b"hello");

    let (status, body) = app.get("/api/aws/s3/list?prefix=uploads/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["files"], json!([key.clone()]));

    let (status, body) = app.delete(&format!("/api/aws/s3/files/{key}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], format!("File {key} deleted successfully"));
    assert!(app.cloud.log().objects.is_empty());
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let app = TestApp::new().await;
    let (status, _, body) = app.send(multipart("other", "a.txt", "x")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No file uploaded");
}

#[tokio::test]
async fn test_cloudfront_distributions_and_invalidation() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/aws/cloudfront/distributions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["distributions"][0]["domainName"], "d111111abcdef8.cloudfront.net");

    let (status, body) = app
        .post(
            "/api/aws/cloudfront/invalidate",
            &json!({"distributionId": "E2TESTDIST", "paths": ["/index.html", "/assets/*"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cache invalidation started");
    assert_eq!(body["invalidation"]["status"], "InProgress");

    let log = app.cloud.log();
    assert_eq!(log.invalidations.len(), 1);
    assert_eq!(log.invalidations[0].0, "E2TESTDIST");
    assert_eq!(log.invalidations[0].1, ["/index.html", "/assets/*"]);
}

#[tokio::test]
async fn test_invalidation_requires_paths() {
    let app = TestApp::new().await;
    let (status, body) = app
        .post(
            "/api/aws/cloudfront/invalidate",
            &json!({"distributionId": "E2TESTDIST", "paths": []}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid data. Provide a distributionId and an array of paths"
    );
    assert_eq!(error_fields(&body), ["paths"]);
    assert!(app.cloud.log().invalidations.is_empty());
}

#[tokio::test]
async fn test_lambda_list_and_invoke() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/aws/lambda/functions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["functions"][0]["name"], "resize-image");
    assert_eq!(body["functions"][0]["memorySize"], 128);

    let (status, body) = app
        .post("/api/aws/lambda/invoke/resize-image", &json!({"width": 600}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Function resize-image invoked successfully");
    assert_eq!(body["result"], json!({"echo": {"width": 600}}));
}

#[tokio::test]
async fn test_invoke_without_body_sends_empty_object() {
    let app = TestApp::new().await;
    let request = Request::post("/api/aws/lambda/invoke/warmup")
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.cloud.log().invocations[0], ("warmup".to_string(), json!({})));
}

#[tokio::test]
async fn test_upstream_failure_is_prefixed_500() {
    let app = TestApp::with(test_config(&[]), FakeCloud::failing()).await;

    let (status, body) = app.get("/api/aws/s3/list").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "S3 list failed: simulated outage");

    let (status, body) = app
        .post(
            "/api/aws/cloudfront/invalidate",
            &json!({"distributionId": "E2TESTDIST", "paths": ["/"]}),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "CloudFront invalidation failed: simulated outage");
}
