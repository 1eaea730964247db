//! character.ai client -- [`CharacterChatClient`] / [`CharacterChat`]
//! implementations over the character.ai web API.
//!
//! Authentication yields a session token that is sent as
//! `Authorization: Token <token>` on every later request. The token is held
//! as a [`SecretString`] and never logged.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use parley_core::upstream::character::{CharacterChat, CharacterChatClient};
use parley_types::character::{CharacterReply, HistoryMessage};
use parley_types::config::CharacterAiConfig;
use parley_types::error::BackendError;

use crate::http::{build_client, ensure_success, join_url, transport_error};

use self::types::{
    ContinueHistoryRequest, CreateHistoryRequest, HistoryInfo, HistoryMessagesResponse,
    LazyAuthRequest, LazyAuthResponse, StreamingChunk, StreamingRequest, TokenAuthRequest,
    TokenAuthResponse,
};

/// Body the service returns from `continue` when no chat exists yet.
const NO_HISTORY_MARKER: &str = "there is no history between user and character";

/// Unauthenticated-then-authenticated entry point to character.ai.
///
/// Does NOT derive Debug so the session token cannot leak through it.
pub struct CharacterAiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<Arc<SecretString>>,
}

impl CharacterAiClient {
    pub fn new(config: &CharacterAiConfig, timeout: Duration) -> Result<Self, BackendError> {
        Ok(Self {
            http: build_client(timeout, config.user_agent.as_deref())?,
            base_url: config.base_url.clone(),
            token: None,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn session_token(&self) -> Result<Arc<SecretString>, BackendError> {
        self.token.clone().ok_or(BackendError::AuthenticationFailed)
    }

    fn store_token(&mut self, token: Option<String>) -> Result<(), BackendError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(BackendError::AuthenticationFailed)?;
        self.token = Some(Arc::new(SecretString::from(token)));
        Ok(())
    }
}

impl CharacterChatClient for CharacterAiClient {
    type Chat = CharacterAiChat;

    async fn authenticate_as_guest(&mut self) -> Result<(), BackendError> {
        let body = LazyAuthRequest {
            lazy_uuid: uuid::Uuid::new_v4().to_string(),
        };
        let response = self
            .http
            .post(self.url("chat/auth/lazy/"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let auth: LazyAuthResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(format!("failed to parse guest login: {e}")))?;

        if auth.success == Some(false) {
            return Err(BackendError::AuthenticationFailed);
        }
        self.store_token(auth.token)?;
        tracing::info!("authenticated with character.ai as guest");
        Ok(())
    }

    async fn authenticate_with_token(&mut self, token: &SecretString) -> Result<(), BackendError> {
        let body = TokenAuthRequest {
            access_token: token.expose_secret(),
        };
        let response = self
            .http
            .post(self.url("dj-rest-auth/auth0/"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let auth: TokenAuthResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(format!("failed to parse token login: {e}")))?;

        self.store_token(auth.key)?;
        tracing::info!("authenticated with character.ai using access token");
        Ok(())
    }

    async fn create_or_continue_chat(&self, character_id: &str) -> Result<CharacterAiChat, BackendError> {
        let token = self.session_token()?;
        let mut chat = CharacterAiChat {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token,
            character_id: character_id.to_string(),
            external_id: String::new(),
            ai_username: String::new(),
        };

        let response = chat
            .post(
                "chat/history/continue/",
                &ContinueHistoryRequest {
                    character_external_id: character_id,
                    history_external_id: None,
                },
            )
            .await?;

        let body = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(transport_error)?;

        let info = match parse_continue_body(&body)? {
            Some(info) => {
                tracing::debug!(history = %info.external_id, "continuing existing chat");
                info
            }
            None => {
                tracing::debug!(character_id, "no existing chat, creating one");
                chat.create_history().await?
            }
        };
        chat.adopt(&info)?;
        Ok(chat)
    }
}

/// An open character.ai chat.
pub struct CharacterAiChat {
    http: reqwest::Client,
    base_url: String,
    token: Arc<SecretString>,
    character_id: String,
    external_id: String,
    ai_username: String,
}

impl CharacterAiChat {
    async fn post<B: serde::Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, BackendError> {
        self.http
            .post(join_url(&self.base_url, path))
            .header("Authorization", format!("Token {}", self.token.expose_secret()))
            .json(body)
            .send()
            .await
            .map_err(transport_error)
    }

    async fn create_history(&self) -> Result<HistoryInfo, BackendError> {
        let response = self
            .post(
                "chat/history/create/",
                &CreateHistoryRequest {
                    character_external_id: &self.character_id,
                    history_external_id: None,
                    override_history_set: None,
                },
            )
            .await?;
        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(format!("failed to parse chat history: {e}")))
    }

    /// Point this handle at `info`. The character's participant id is kept
    /// from the previous history when the new one does not list it.
    fn adopt(&mut self, info: &HistoryInfo) -> Result<(), BackendError> {
        if let Some(ai) = info.ai_username() {
            self.ai_username = ai.to_string();
        }
        if self.ai_username.is_empty() {
            return Err(BackendError::MalformedResponse(
                "chat history has no character participant".to_string(),
            ));
        }
        self.external_id = info.external_id.clone();
        Ok(())
    }
}

impl CharacterChat for CharacterAiChat {
    async fn save_and_start_new_chat(&mut self) -> Result<(), BackendError> {
        let info = self.create_history().await?;
        self.adopt(&info)?;
        tracing::debug!(history = %self.external_id, "started new chat");
        Ok(())
    }

    async fn fetch_history(&self) -> Result<Vec<HistoryMessage>, BackendError> {
        let response = self
            .http
            .get(join_url(&self.base_url, "chat/history/msgs/user/"))
            .query(&[("history_external_id", self.external_id.as_str())])
            .header("Authorization", format!("Token {}", self.token.expose_secret()))
            .send()
            .await
            .map_err(transport_error)?;
        let decoded: HistoryMessagesResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(format!("failed to parse messages: {e}")))?;

        Ok(decoded
            .messages
            .into_iter()
            .map(|m| HistoryMessage {
                id: m.id,
                text: m.text,
                src_name: m.src_name,
                chat_external_id: self.external_id.clone(),
            })
            .collect())
    }

    async fn send_and_await_response(&self, text: &str) -> Result<CharacterReply, BackendError> {
        let body = StreamingRequest::new(&self.external_id, &self.character_id, &self.ai_username, text);
        let response = self.post("chat/streaming/", &body).await?;
        let raw = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(transport_error)?;

        let chunk = parse_streaming_body(&raw)?;
        reply_from_chunk(chunk, &self.external_id)
    }
}

/// Decode the body of a successful `continue` call.
///
/// `Ok(None)` means the service has no chat with this character yet.
pub fn parse_continue_body(body: &str) -> Result<Option<HistoryInfo>, BackendError> {
    if body.trim() == NO_HISTORY_MARKER {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| BackendError::MalformedResponse(format!("failed to parse chat history: {e}")))
}

/// Pick the final chunk out of a newline-delimited streaming response.
///
/// Falls back to the last parseable chunk when none is flagged final.
pub fn parse_streaming_body(body: &str) -> Result<StreamingChunk, BackendError> {
    let mut last = None;
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Ok(chunk) = serde_json::from_str::<StreamingChunk>(line) else {
            continue;
        };
        if chunk.abort {
            return Err(BackendError::Upstream {
                message: chunk
                    .error
                    .unwrap_or_else(|| "character.ai aborted the reply".to_string()),
            });
        }
        if chunk.is_final_chunk {
            return Ok(chunk);
        }
        last = Some(chunk);
    }
    last.ok_or_else(|| BackendError::MalformedResponse("empty streaming response".to_string()))
}

/// Map the first candidate of a final chunk to a [`CharacterReply`].
pub fn reply_from_chunk(chunk: StreamingChunk, chat_external_id: &str) -> Result<CharacterReply, BackendError> {
    let src_character_name = chunk
        .src_char
        .map(|c| c.participant.name)
        .unwrap_or_default();
    let reply = chunk
        .replies
        .into_iter()
        .next()
        .ok_or_else(|| BackendError::MalformedResponse("reply chunk has no candidates".to_string()))?;

    Ok(CharacterReply {
        id: reply.id,
        text: reply.text,
        image_relative_path: reply.image_rel_path.filter(|p| !p.is_empty()),
        src_character_name,
        chat_external_id: chat_external_id.to_string(),
    })
}
