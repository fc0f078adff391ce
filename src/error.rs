//! Error types for the Subraya server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    msg.clone(),
                )
            }
            AppError::Store(e) => match e {
                StoreError::PdfNotFound { id } => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    format!("PDF not found: {}", id),
                ),
                StoreError::Schema(_) => {
                    tracing::error!("Schema unavailable: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "schema_error",
                        e.to_string(),
                    )
                }
                StoreError::Transaction(_) => {
                    tracing::error!("Bulk write rolled back: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "transaction_error",
                        e.to_string(),
                    )
                }
                StoreError::FileRead { .. } => {
                    tracing::error!("File read failed: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "file_read_error",
                        e.to_string(),
                    )
                }
                _ => {
                    tracing::error!("Storage error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "storage_error",
                        e.to_string(),
                    )
                }
            },
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        });

        (status, body).into_response()
    }
}
