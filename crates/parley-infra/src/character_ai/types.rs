//! character.ai web API types.
//!
//! Request/response structures of the (unofficial) character.ai chat API.
//! Message ids arrive as JSON numbers or strings; both decode to `String`.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST chat/auth/lazy/`.
#[derive(Debug, Clone, Serialize)]
pub struct LazyAuthRequest {
    pub lazy_uuid: String,
}

/// Response of `POST chat/auth/lazy/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LazyAuthResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `POST dj-rest-auth/auth0/`.
#[derive(Debug, Clone, Serialize)]
pub struct TokenAuthRequest<'a> {
    pub access_token: &'a str,
}

/// Response of `POST dj-rest-auth/auth0/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenAuthResponse {
    #[serde(default)]
    pub key: Option<String>,
}

/// Body of `POST chat/history/continue/`.
#[derive(Debug, Clone, Serialize)]
pub struct ContinueHistoryRequest<'a> {
    pub character_external_id: &'a str,
    pub history_external_id: Option<&'a str>,
}

/// Body of `POST chat/history/create/`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateHistoryRequest<'a> {
    pub character_external_id: &'a str,
    pub history_external_id: Option<&'a str>,
    pub override_history_set: Option<&'a str>,
}

/// Chat history descriptor returned by continue/create.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryInfo {
    pub external_id: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl HistoryInfo {
    /// Internal username of the character in this chat.
    pub fn ai_username(&self) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| p.is_human == Some(false))
            .map(|p| p.user.username.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub is_human: Option<bool>,
    pub user: ParticipantUser,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantUser {
    pub username: String,
}

/// Response of `GET chat/history/msgs/user/`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessagesResponse {
    #[serde(default)]
    pub messages: Vec<WireHistoryMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireHistoryMessage {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "src__name", default)]
    pub src_name: String,
}

/// Body of `POST chat/streaming/`.
#[derive(Debug, Clone, Serialize)]
pub struct StreamingRequest<'a> {
    pub history_external_id: &'a str,
    pub character_external_id: &'a str,
    pub text: &'a str,
    pub tgt: &'a str,
    pub ranking_method: &'static str,
    pub staging: bool,
    pub stream_every_n_steps: u32,
    pub chunks_to_pad: u32,
    pub is_proactive: bool,
    pub enable_tti: bool,
    pub num_candidates: u32,
    pub give_room_introductions: bool,
    pub image_rel_path: &'static str,
    pub image_description: &'static str,
    pub voice_enabled: bool,
}

impl<'a> StreamingRequest<'a> {
    pub fn new(history_external_id: &'a str, character_external_id: &'a str, tgt: &'a str, text: &'a str) -> Self {
        Self {
            history_external_id,
            character_external_id,
            text,
            tgt,
            ranking_method: "random",
            staging: false,
            stream_every_n_steps: 16,
            chunks_to_pad: 8,
            is_proactive: false,
            enable_tti: true,
            num_candidates: 1,
            give_room_introductions: true,
            image_rel_path: "",
            image_description: "",
            voice_enabled: false,
        }
    }
}

/// One newline-delimited chunk of a `chat/streaming/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamingChunk {
    #[serde(default)]
    pub replies: Vec<WireReply>,
    #[serde(default)]
    pub src_char: Option<SourceCharacter>,
    #[serde(default)]
    pub is_final_chunk: bool,
    #[serde(default)]
    pub abort: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireReply {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image_rel_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceCharacter {
    pub participant: SourceParticipant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceParticipant {
    pub name: String,
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}
