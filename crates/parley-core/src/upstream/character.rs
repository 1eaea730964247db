//! Character-chat service port used by the character backend.
//!
//! The remote service owns authentication, the chat session and its history.
//! The backend only ever holds a [`CharacterChat`] handle and delegates to it.

use secrecy::SecretString;

use parley_types::character::{CharacterReply, HistoryMessage};
use parley_types::error::BackendError;

/// Unauthenticated entry point to the service.
pub trait CharacterChatClient: Send + Sync {
    /// Handle type for an open chat.
    type Chat: CharacterChat + 'static;

    fn authenticate_as_guest(
        &mut self,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;

    fn authenticate_with_token(
        &mut self,
        token: &SecretString,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;

    /// Resume the latest chat with `character_id`, or create one.
    fn create_or_continue_chat(
        &self,
        character_id: &str,
    ) -> impl std::future::Future<Output = Result<Self::Chat, BackendError>> + Send;
}

/// An open remote chat session.
pub trait CharacterChat: Send + Sync {
    /// Archive the current chat and switch this handle to a fresh one.
    fn save_and_start_new_chat(
        &mut self,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;

    /// Messages of the current chat, oldest first.
    fn fetch_history(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<HistoryMessage>, BackendError>> + Send;

    /// Send one message and wait for the complete reply.
    fn send_and_await_response(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<CharacterReply, BackendError>> + Send;
}
