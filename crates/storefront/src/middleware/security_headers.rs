//! Security headers for API responses and the client bundle.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
    },
    middleware::Next,
    response::Response,
};

/// JSON responses never load subresources or get framed.
const API_CSP: &str = "default-src 'none'; frame-ancestors 'none'";

/// Add security headers to every response.
///
/// All responses get `X-Frame-Options: DENY`, `X-Content-Type-Options:
/// nosniff`, a strict referrer policy and `Cross-Origin-Opener-Policy`.
/// Responses under `/api/` additionally get a deny-all CSP and
/// `Cache-Control: no-store`, since they carry order and profile data. The
/// static client bundle keeps whatever caching `ServeDir` chose.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let is_api = request.uri().path().starts_with("/api/");
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    if is_api {
        headers.insert(CONTENT_SECURITY_POLICY, HeaderValue::from_static(API_CSP));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    response
}
