//! Chat session HTTP handlers.
//!
//! Endpoints:
//! - GET  /start - Begin a new conversation and return its greeting
//! - POST /send  - Send `{"message": "..."}` and return the reply

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use parley_types::chat::ChatResponse;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for `POST /send`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// GET /start - Start a new chat and return the greeting.
pub async fn start_chat(State(state): State<AppState>) -> Result<Json<ChatResponse>, AppError> {
    let mut backend = state.backend.lock().await;
    let greeting = backend.start().await?;
    tracing::info!(backend = backend.name(), chat_id = %greeting.chat_id, "chat started");
    Ok(Json(greeting))
}

/// POST /send - Send a message to the character and return its reply.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let mut backend = state.backend.lock().await;
    let reply = backend.receive(&body.message).await?;
    tracing::debug!(backend = backend.name(), id = %reply.id, "reply delivered");
    Ok(Json(reply))
}
