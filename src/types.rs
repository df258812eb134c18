// Type definitions and shared error surface

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Advisor API error: {0}")]
    Advisor(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported case: {0}")]
    UnsupportedCase(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::InvalidRequest(msg) | AppError::UnsupportedCase(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg)
            }
            // Upstream and internal faults stay opaque to the caller.
            AppError::Advisor(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to orchestrate the agent pipeline.".to_string(),
            ),
        };

        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}
