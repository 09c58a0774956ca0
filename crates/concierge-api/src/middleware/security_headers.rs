//! Security headers middleware
//!
//! Answers are built from a per-request guide and must never be cached by
//! intermediaries. Headers set on every response:
//! - X-Content-Type-Options: nosniff
//! - X-Frame-Options: DENY
//! - Cache-Control: no-store
//! - Referrer-Policy: no-referrer
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Adds security and cache headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::StatusCode,
        middleware,
        response::IntoResponse,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_headers_added() {
        let app = Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(middleware::from_fn(security_headers_middleware));

        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
        assert_eq!(headers.get(header::REFERRER_POLICY).unwrap(), "no-referrer");
    }

    #[tokio::test]
    async fn test_headers_on_error_response() {
        async fn error_handler() -> impl IntoResponse {
            (StatusCode::BAD_REQUEST, "bad")
        }

        let app = Router::new()
            .route("/error", post(error_handler))
            .layer(middleware::from_fn(security_headers_middleware));

        let request = Request::builder()
            .method("POST")
            .uri("/error")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(header::CACHE_CONTROL).is_some());
    }
}
