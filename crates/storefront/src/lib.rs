//! AviatorX storefront API.
//!
//! This crate provides the storefront server as a library so that the
//! router can be exercised in tests and reused by the CLI.
//!
//! # Architecture
//!
//! - Axum JSON API consumed by the client-rendered storefront
//! - Repositories behind the [`db::Store`] trait: in-memory (seeded from the
//!   built-in catalog) or `PostgreSQL`
//! - Cloud resource adapters (S3, CloudFront, Lambda) for the admin panel
//! - Optional static serving of the client bundle with SPA fallback

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header::CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
};
use tower::ServiceExt;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the store answers before returning OK.
/// Returns 503 Service Unavailable otherwise.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, backend = state.store().backend(), "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": "Not found" })),
    )
}

/// CORS for a separately hosted client, when an origin is configured.
fn cors_layer(allowed_origin: Option<&str>) -> Option<CorsLayer> {
    let origin = allowed_origin?;
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([CONTENT_TYPE]),
        ),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring invalid allowed origin");
            None
        }
    }
}

/// Build the full application router.
///
/// Sentry layers are added by the binary so that tests run without a hub.
pub fn build_app(state: AppState) -> Router {
    let config = state.config();
    let static_dir = config.static_dir.clone();
    let cors = cors_layer(config.allowed_origin.as_deref());

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes());

    app = match static_dir {
        Some(dir) => {
            let spa = ServeDir::new(&dir).fallback(ServeFile::new(dir.join("index.html")));
            app.fallback(move |request: Request| {
                let spa = spa.clone();
                async move {
                    // Unknown API paths stay JSON 404s instead of serving the client
                    if request.uri().path().starts_with("/api/") {
                        return not_found().await.into_response();
                    }
                    match spa.oneshot(request).await {
                        Ok(response) => response.into_response(),
                        Err(never) => match never {},
                    }
                }
            })
        }
        None => app.fallback(not_found),
    };

    let mut app = app
        .with_state(state)
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ));

    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    app.layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_cors_layer_only_with_valid_origin() {
        assert!(cors_layer(None).is_none());
        assert!(cors_layer(Some("https://shop.aviatorx.example")).is_some());
        assert!(cors_layer(Some("bad\norigin")).is_none());
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        use axum::body::Body;

        let config = config::StorefrontConfig::from_source(&|_| None).unwrap();
        let cloud = services::aws::CloudAdapters::from_config(&config.aws).await;
        let state = AppState::new(config, Arc::new(db::MemoryStore::new()), cloud);

        let response = build_app(state)
            .oneshot(
                axum::http::Request::get("/nowhere")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
