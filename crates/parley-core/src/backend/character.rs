//! Character backend: delegates the whole session to a remote character-chat
//! service and republishes its messages in canonical form.

use secrecy::SecretString;

use parley_types::character::{CharacterReply, HistoryMessage};
use parley_types::chat::ChatResponse;
use parley_types::error::BackendError;

use super::chat_backend::ChatBackend;
use crate::upstream::character::{CharacterChat, CharacterChatClient};

/// Conversation owned by a remote character-chat service.
///
/// Holds only the remote chat handle and the configured character id; the
/// history lives upstream. The chat is opened (or resumed) during
/// [`initialize`](Self::initialize), so `receive` before `start` continues
/// that remote chat.
pub struct CharacterChatBackend<S> {
    chat: S,
    character_id: String,
}

impl<S: CharacterChat> CharacterChatBackend<S> {
    /// Authenticate (as guest when no token is given) and open the chat.
    ///
    /// The three steps run in order and any failure aborts initialization.
    pub async fn initialize<C>(
        mut client: C,
        access_token: Option<&SecretString>,
        character_id: &str,
    ) -> Result<Self, BackendError>
    where
        C: CharacterChatClient<Chat = S>,
    {
        match access_token {
            Some(token) => client.authenticate_with_token(token).await?,
            None => {
                tracing::info!("no access token configured, authenticating as guest");
                client.authenticate_as_guest().await?;
            }
        }

        let chat = client.create_or_continue_chat(character_id).await?;
        tracing::info!(character_id, "character chat opened");

        Ok(Self::from_chat(chat, character_id))
    }

    /// Wrap an already-open chat handle.
    pub fn from_chat(chat: S, character_id: &str) -> Self {
        Self {
            chat,
            character_id: character_id.to_string(),
        }
    }

    pub fn character_id(&self) -> &str {
        &self.character_id
    }

    fn greeting_response(&self, first: Option<HistoryMessage>) -> ChatResponse {
        let first = first.unwrap_or_else(|| {
            tracing::warn!(
                character_id = %self.character_id,
                "remote history is empty, returning an unset greeting"
            );
            HistoryMessage {
                id: String::new(),
                text: String::new(),
                src_name: String::new(),
                chat_external_id: String::new(),
            }
        });

        ChatResponse {
            id: first.id,
            character_id: self.character_id.clone(),
            chat_id: first.chat_external_id,
            image_relative_path: None,
            src_name: first.src_name,
            text: first.text,
        }
    }

    fn reply_response(&self, reply: CharacterReply) -> ChatResponse {
        ChatResponse {
            id: reply.id,
            character_id: self.character_id.clone(),
            chat_id: reply.chat_external_id,
            image_relative_path: reply.image_relative_path,
            src_name: reply.src_character_name,
            text: reply.text,
        }
    }
}

impl<S: CharacterChat> ChatBackend for CharacterChatBackend<S> {
    fn name(&self) -> &str {
        "characterai"
    }

    async fn start(&mut self) -> Result<ChatResponse, BackendError> {
        self.chat.save_and_start_new_chat().await?;
        let history = self.chat.fetch_history().await?;
        tracing::debug!(messages = history.len(), "fetched remote history");
        Ok(self.greeting_response(history.into_iter().next()))
    }

    async fn receive(&mut self, message: &str) -> Result<ChatResponse, BackendError> {
        let reply = self.chat.send_and_await_response(message).await?;
        Ok(self.reply_response(reply))
    }
}
