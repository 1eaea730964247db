//! OllamaClient -- [`CompletionClient`] implementation for an Ollama server.
//!
//! Sends the full transcript to `/api/chat` on every call (non-streaming)
//! and requests model pulls through `/api/pull`.

pub mod types;

use std::time::Duration;

use parley_core::upstream::completion::{CompletionClient, CompletionRequest};
use parley_types::error::BackendError;
use parley_types::llm::{CompletionReply, Message, MessageRole};

use crate::http::{build_client, ensure_success, join_url, transport_error};

use self::types::{ChatOptions, ChatRequest, ChatResponse, PullProgress, PullRequest};

/// Deadline for a whole model download, progress stream included. The
/// client-wide timeout only bounds chat calls.
pub const MODEL_PULL_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);

/// HTTP client for a self-hosted Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(timeout, None)?,
            base_url: base_url.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Build the `/api/chat` body for a completion request.
    pub fn to_chat_request<'a>(request: &CompletionRequest<'a>) -> ChatRequest<'a> {
        ChatRequest {
            model: request.model,
            stream: false,
            options: ChatOptions {
                temperature: request.temperature,
            },
            messages: request.messages,
        }
    }

    /// Convert a decoded `/api/chat` response into a transcript reply.
    pub fn to_completion_reply(response: ChatResponse) -> Result<CompletionReply, BackendError> {
        if response.done == Some(false) {
            return Err(BackendError::MalformedResponse(
                "chat response is not final".to_string(),
            ));
        }
        let role: MessageRole = response
            .message
            .role
            .parse()
            .map_err(BackendError::MalformedResponse)?;

        Ok(CompletionReply {
            message: Message {
                role,
                content: response.message.content,
            },
            created_at: response.created_at,
        })
    }

    /// Ask the server to pull `model` and return the still-streaming
    /// progress response.
    async fn request_pull(&self, model: &str) -> Result<reqwest::Response, BackendError> {
        let response = self
            .client
            .post(self.url("api/pull"))
            .timeout(MODEL_PULL_TIMEOUT)
            .json(&PullRequest { name: model })
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await
    }

    /// Read a pull progress stream to the end and return the last reported
    /// status. An `error` line ends the pull with an upstream error.
    pub async fn drain_pull_stream(mut response: reqwest::Response) -> Result<Option<String>, BackendError> {
        let mut pending = Vec::new();
        let mut last_status = None;

        loop {
            let chunk = response.chunk().await.map_err(transport_error)?;
            let at_end = chunk.is_none();
            if let Some(chunk) = chunk {
                pending.extend_from_slice(&chunk);
            }

            while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                if let Some(status) = Self::read_pull_line(&line)? {
                    last_status = Some(status);
                }
            }

            if at_end {
                if let Some(status) = Self::read_pull_line(&pending)? {
                    last_status = Some(status);
                }
                return Ok(last_status);
            }
        }
    }

    fn read_pull_line(line: &[u8]) -> Result<Option<String>, BackendError> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let Ok(progress) = serde_json::from_slice::<PullProgress>(line) else {
            return Ok(None);
        };
        if let Some(error) = progress.error {
            return Err(BackendError::Upstream { message: error });
        }
        if let Some(status) = &progress.status {
            tracing::debug!(%status, "model pull progress");
        }
        Ok(progress.status)
    }
}

impl CompletionClient for OllamaClient {
    /// Returns once the server has accepted the pull. The progress stream is
    /// drained in the background; its outcome is only logged.
    async fn ensure_model(&self, model: &str) -> Result<(), BackendError> {
        let response = self.request_pull(model).await?;

        let model = model.to_string();
        tokio::spawn(async move {
            match Self::drain_pull_stream(response).await {
                Ok(status) => tracing::info!(%model, status = status.as_deref().unwrap_or(""), "model pull finished"),
                Err(e) => tracing::warn!(%model, "model pull failed: {e}"),
            }
        });
        Ok(())
    }

    async fn chat(&self, request: CompletionRequest<'_>) -> Result<CompletionReply, BackendError> {
        let body = Self::to_chat_request(&request);

        let response = self
            .client
            .post(self.url("api/chat"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = ensure_success(response).await?;

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            BackendError::MalformedResponse(format!("failed to parse chat response: {e}"))
        })?;

        Self::to_completion_reply(chat_response)
    }
}
