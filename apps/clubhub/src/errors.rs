use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message returned to callers whenever the chat pipeline fails upstream.
pub const AI_FAILURE_MESSAGE: &str = "Failed to fetch AI response";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The model call itself failed (transport, API status, unparseable output).
    #[error("LLM error: {0}")]
    Llm(String),

    /// The resolver answered, but with neither a reply nor club ids.
    #[error("Malformed upstream response: {0}")]
    UpstreamMalformed(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Unparseable or mistyped JSON bodies become 400s with the `{ "error" }` body.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    AI_FAILURE_MESSAGE.to_string(),
                )
            }
            AppError::UpstreamMalformed(payload) => {
                tracing::error!("Malformed resolver response: {payload}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    AI_FAILURE_MESSAGE.to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
