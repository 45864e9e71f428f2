//! Axum route handler for the chat assistant.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::chat::pipeline::{run_chat, ChatResult};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    // Accepted for client compatibility; each turn is answered independently.
    #[allow(dead_code)]
    #[serde(default)]
    pub history: Option<Value>,
}

/// POST /api/chat
///
/// Answers one user message. Missing, null or blank messages and unreadable
/// bodies are rejected before any model call.
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResult>, AppError> {
    let Json(request) = payload?;
    let message = request.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let result = run_chat(
        state.llm.as_ref(),
        &state.corpus,
        message,
        state.grounding_failure_policy,
    )
    .await?;

    Ok(Json(result))
}
