/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use betnad_core::BetnadError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Request body missing, malformed or failing field checks
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] BetnadError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ServerError::Validation(msg) => {
                tracing::debug!(reason = %msg, "Request rejected by validation");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg)
            }
            ServerError::Core(ref e) => {
                tracing::error!(error = %e, "Unhandled domain error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    e.client_message().to_string(),
                )
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Configuration error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}
