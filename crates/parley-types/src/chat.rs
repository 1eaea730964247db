//! Canonical chat response returned by every backend.

use serde::{Deserialize, Serialize};

/// One assistant message in normalized form.
///
/// Every backend maps its upstream reply into this shape so the HTTP layer
/// can treat them identically. All six fields are always serialized; a
/// missing image is `null`, never an absent key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    /// Backend-assigned message id, unique within a chat.
    pub id: String,
    /// Persona or model that produced the reply.
    pub character_id: String,
    /// Conversation the message belongs to.
    pub chat_id: String,
    /// Relative path of an attached image.
    pub image_relative_path: Option<String>,
    /// Human-readable label of the producer.
    pub src_name: String,
    /// Message body.
    pub text: String,
}
