use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Request-level failure. Store errors are logged where they happen and
/// reach the client only as a fixed per-endpoint message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(&'static str),
}

impl AppError {
    /// Log `cause` and collapse it into a generic 500.
    pub fn internal(message: &'static str, cause: impl Display) -> Self {
        error!(error = %cause, "{}", message);
        Self::Internal(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
            AppError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
