//! Echo backend: replies with exactly the message it was sent.
//!
//! Deterministic and dependency-free, so the HTTP boundary and the canonical
//! response shape can be exercised without any upstream service.

use parley_types::chat::ChatResponse;
use parley_types::error::BackendError;

use super::chat_backend::ChatBackend;

/// Greeting returned by every `start`.
pub const ECHO_GREETING: &str = "welcome to the echo chamber.";

/// Character and source label of every echo message.
pub const ECHO_CHARACTER: &str = "echo-backend";

/// Counter-based echo backend.
///
/// `message_id` advances only on `receive`; the chat id advances only on
/// `start`. A `receive` before any `start` is allowed and reports chat `0`.
#[derive(Debug, Default)]
pub struct EchoBackend {
    message_id: u64,
    chat_id: u64,
    next_chat_id: u64,
}

impl EchoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn response(&self, text: &str) -> ChatResponse {
        ChatResponse {
            id: self.message_id.to_string(),
            character_id: ECHO_CHARACTER.to_string(),
            chat_id: self.chat_id.to_string(),
            image_relative_path: None,
            src_name: ECHO_CHARACTER.to_string(),
            text: text.to_string(),
        }
    }
}

impl ChatBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    async fn start(&mut self) -> Result<ChatResponse, BackendError> {
        self.chat_id = self.next_chat_id;
        self.next_chat_id += 1;
        tracing::debug!(chat_id = self.chat_id, "echo chat started");
        Ok(self.response(ECHO_GREETING))
    }

    async fn receive(&mut self, message: &str) -> Result<ChatResponse, BackendError> {
        self.message_id += 1;
        Ok(self.response(message))
    }
}
