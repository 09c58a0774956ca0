//! Guest question handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::Method,
    Json,
};
use concierge_core::{ConciergeError, ConciergeRequest, ConciergeResponse};
use std::sync::Arc;

/// Answer a guest question from the supplied guide
///
/// The body is read raw so that an empty body counts as `{}`, and malformed
/// JSON or an oversized body gets the same error shape as every other
/// failure.
#[utoipa::path(
    post,
    path = "/api/concierge",
    tag = "concierge",
    request_body = ConciergeRequest,
    responses(
        (status = 200, description = "Answer generated", body = ConciergeResponse),
        (status = 400, description = "Missing question or invalid JSON", body = crate::error::ApiError),
        (status = 405, description = "Method not allowed", body = crate::error::ApiError),
        (status = 408, description = "Request timed out", body = crate::error::ApiError),
        (status = 413, description = "Request body too large", body = crate::error::ApiError),
        (status = 500, description = "Missing API key or completion API failure", body = crate::error::ApiError)
    )
)]
pub async fn concierge_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ConciergeResponse>, AppError> {
    state.increment_requests();

    state.responder.ensure_configured()?;
    let body = body?;
    let request = ConciergeRequest::from_slice(&body)?;

    let response = state.responder.respond(&request).await.map_err(|e| {
        if matches!(e, ConciergeError::UpstreamError { .. }) {
            tracing::error!(error = %e, "completion API call failed");
        }
        e
    })?;

    Ok(Json(response))
}

/// Reject every method other than POST
pub async fn method_not_allowed(method: Method) -> AppError {
    tracing::debug!(%method, "method not allowed");
    ConciergeError::MethodNotAllowed(method.to_string()).into()
}
