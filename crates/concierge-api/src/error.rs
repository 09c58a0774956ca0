//! API error handling
//!
//! Author: hephaex@gmail.com

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use concierge_core::ConciergeError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    #[schema(example = "BAD_REQUEST")]
    pub code: String,
    /// Human-readable message
    #[schema(example = "Missing question")]
    pub error: String,
    /// Upstream HTTP status, for completion API failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
            status: None,
            details: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn method_not_allowed() -> Self {
        Self::new("METHOD_NOT_ALLOWED", "Method Not Allowed")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Server error")
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    MethodNotAllowed,
    BadRequest(String),
    PayloadTooLarge(String),
    Timeout,
    Configuration(String),
    Upstream {
        message: String,
        status: Option<u16>,
        details: String,
    },
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, ApiError::method_not_allowed())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::bad_request(msg)),
            AppError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiError::new("PAYLOAD_TOO_LARGE", "Request body too large").with_details(msg),
            ),
            AppError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                ApiError::new("REQUEST_TIMEOUT", "Request timed out"),
            ),
            AppError::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("CONFIGURATION_ERROR", msg),
            ),
            AppError::Upstream {
                message,
                status,
                details,
            } => {
                let mut error = ApiError::new("UPSTREAM_ERROR", message).with_details(details);
                if let Some(upstream_status) = status {
                    error = error.with_status(upstream_status);
                }
                (StatusCode::INTERNAL_SERVER_ERROR, error)
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal_error().with_details(msg),
            ),
        };

        (status, Json(error)).into_response()
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

impl From<ConciergeError> for AppError {
    fn from(err: ConciergeError) -> Self {
        match err {
            ConciergeError::MethodNotAllowed(_) => AppError::MethodNotAllowed,
            ConciergeError::ValidationError(msg) => AppError::BadRequest(msg),
            ConciergeError::ConfigError(msg) => AppError::Configuration(msg),
            ConciergeError::UpstreamError {
                message,
                status,
                details,
            } => AppError::Upstream {
                message,
                status,
                details,
            },
            ConciergeError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
