//! Ollama REST API types.
//!
//! Wire structures for `/api/pull` and `/api/chat`. They are NOT the generic
//! transcript types from parley-types -- those are server-agnostic.

use serde::{Deserialize, Serialize};

use parley_types::llm::Message;

/// Request body for `POST /api/pull`.
#[derive(Debug, Clone, Serialize)]
pub struct PullRequest<'a> {
    pub name: &'a str,
}

/// One newline-delimited progress line of a `POST /api/pull` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PullProgress {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub stream: bool,
    pub options: ChatOptions,
    pub messages: &'a [Message],
}

/// Sampling options of a chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatOptions {
    pub temperature: f64,
}

/// Non-streaming response of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub created_at: String,
    pub message: ChatMessage,
    #[serde(default)]
    pub done: Option<bool>,
}

/// Message object inside a chat response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}
