//! Error types for the UWS server.
//!
//! This module provides custom error types that implement `IntoResponse`
//! for seamless integration with Axum handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors for the UWS server.
#[derive(Error, Debug)]
pub enum AppError {
    /// Job or sub-resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request error
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store backend error
    #[error("Store error: {0}")]
    Store(String),

    /// Worker backend error
    #[error("Worker error: {0}")]
    Worker(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Store error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Worker(msg) => {
                tracing::error!(error = %msg, "Worker error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
