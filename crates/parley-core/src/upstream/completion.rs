//! Chat-completion endpoint port used by the model-server backend.

use parley_types::error::BackendError;
use parley_types::llm::{CompletionReply, Message};

/// One stateless completion call: the whole transcript, every time.
///
/// Responses are never streamed.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f64,
}

/// A remote server that can pull models and complete transcripts.
pub trait CompletionClient: Send + Sync {
    /// Ask the server to make `model` available locally.
    ///
    /// Callers treat this as a best-effort warm-up.
    fn ensure_model(
        &self,
        model: &str,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;

    /// Complete the transcript and return the assistant's reply.
    fn chat(
        &self,
        request: CompletionRequest<'_>,
    ) -> impl std::future::Future<Output = Result<CompletionReply, BackendError>> + Send;
}
