//! ChatBackend trait definition.
//!
//! This is the core abstraction every conversational backend implements.

use parley_types::chat::ChatResponse;
use parley_types::error::BackendError;

/// Two-operation conversational contract shared by all backends.
///
/// Both operations mutate session state, so they take `&mut self`; callers
/// that share a backend must serialize access to it.
pub trait ChatBackend: Send {
    /// Short label used in logs and health output (e.g., "echo", "ollama").
    fn name(&self) -> &str;

    /// Begin a new conversation and return its greeting.
    ///
    /// Calling `start` again abandons the current conversation; it never
    /// continues or merges with the previous one.
    fn start(
        &mut self,
    ) -> impl std::future::Future<Output = Result<ChatResponse, BackendError>> + Send;

    /// Submit one user turn and return exactly one reply.
    fn receive(
        &mut self,
        message: &str,
    ) -> impl std::future::Future<Output = Result<ChatResponse, BackendError>> + Send;
}
