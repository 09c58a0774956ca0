//! Concierge API - HTTP server for guest questions
//!
//! Exposes the question responder over HTTP, plus health probes and the
//! OpenAPI document.
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use concierge_core::{ConciergeRequest, ConciergeResponse, DebugInfo};
use error::{ApiError, AppError};
use handlers::{concierge, health};
use state::AppState;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

/// Path the static front-end has always posted to
pub const NETLIFY_FUNCTION_PATH: &str = "/.netlify/functions/concierge";

#[derive(OpenApi)]
#[openapi(
    info(title = "Guest Concierge API", description = "Answers guest questions from the house guide"),
    paths(
        handlers::concierge::concierge_handler,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        ConciergeRequest,
        ConciergeResponse,
        DebugInfo,
        ApiError,
        health::HealthResponse,
        health::ReadinessResponse,
        health::ReadinessChecks,
    )),
    tags(
        (name = "concierge", description = "Guest questions"),
        (name = "health", description = "Liveness and readiness probes")
    )
)]
pub struct ApiDoc;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;
    let body_limit = server.max_body_size;
    let request_timeout = Duration::from_secs(server.request_timeout_secs);
    let cors = cors_layer(&server.cors_origins);

    let ask = post(concierge::concierge_handler).fallback(concierge::method_not_allowed);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/api/concierge", ask.clone())
        .route(NETLIFY_FUNCTION_PATH, ask)
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Render middleware failures (the request timeout) as JSON errors
async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request timed out");
        AppError::Timeout
    } else {
        AppError::Internal(err.to_string())
    }
}

/// Render a handler panic as a JSON error instead of dropping the connection
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(%details, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::internal_error().with_details(details)),
    )
        .into_response()
}

/// CORS for browser front-ends; `*` allows any origin, an empty list none
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AnyOrigin);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
