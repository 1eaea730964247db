//! Records exchanged with the remote character-chat service.
//!
//! These are the service-agnostic shapes the character backend maps into
//! [`ChatResponse`](crate::chat::ChatResponse). Wire formats live in
//! parley-infra.

use serde::{Deserialize, Serialize};

/// One entry of the remote chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub id: String,
    pub text: String,
    /// Display name of whoever wrote the message.
    pub src_name: String,
    /// External id of the chat the message belongs to.
    pub chat_external_id: String,
}

/// The single reply returned for a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterReply {
    pub id: String,
    pub text: String,
    pub image_relative_path: Option<String>,
    pub src_character_name: String,
    pub chat_external_id: String,
}
