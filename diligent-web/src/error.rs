//! Errors returned by the configuration and plugin handlers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diligent_core::DiligentError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    /// Caller already owns a configuration with this title
    #[error("A configuration titled '{0}' already exists")]
    DuplicateTitle(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] DiligentError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation_failed", "message": message }),
            ),
            ApiError::DuplicateTitle(_) => (
                StatusCode::CONFLICT,
                json!({
                    "success": false,
                    "error": "duplicate_title",
                    "message": self.to_string(),
                }),
            ),
            ApiError::NotFound(_) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "not_found", "message": self.to_string() }),
            ),
            ApiError::Storage(err) => {
                err.log();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "internal_error", "message": "Internal server error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
