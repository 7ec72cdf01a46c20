// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat data model and common types shared across the Polychat workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque, globally unique, time-ordered chat identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub String);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The upstream service family an adapter wraps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum ProviderKind {
    Google,
    HuggingFace,
    Nvidia,
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// A single message in a chat transcript.
///
/// Invariant: at most one message per chat has `is_streaming = true`,
/// and it is always the last element of the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Timestamp-derived id, unique within a chat.
    pub id: i64,

    /// Message text. May be empty while the response is still streaming.
    pub content: String,

    pub role: Role,

    /// True only while content is still being appended.
    #[serde(default)]
    pub is_streaming: bool,

    /// Correlation keys into the chat's media items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media_ids: Vec<i64>,
}

impl Message {
    /// Creates a finished (non-streaming) message.
    pub fn new(id: i64, content: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            content: content.into(),
            role,
            is_streaming: false,
            media_ids: Vec::new(),
        }
    }

    /// Creates an empty model-authored placeholder that is still streaming.
    pub fn streaming_placeholder(id: i64) -> Self {
        Self {
            id,
            content: String::new(),
            role: Role::Model,
            is_streaming: true,
            media_ids: Vec::new(),
        }
    }
}

/// Whether a stored attachment is an image or an opaque file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    File,
}

/// A stored attachment, correlated to a message by `message_id`.
///
/// Never mutated after creation; only appended to a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: i64,

    /// Correlation key into the chat history (not ownership).
    pub message_id: i64,

    pub file_name: String,

    /// Base64-encoded payload.
    pub file_data: String,

    /// MIME type, e.g. `image/png`.
    pub file_type: String,

    pub media_type: MediaKind,

    /// Creation time, UNIX milliseconds.
    pub timestamp: i64,
}

/// A chat document: transcript plus attachments.
///
/// Owned by the persistence collaborator at rest; the core holds it only
/// transiently during a single send-and-respond cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,

    pub title: String,

    /// Last-used model identifier.
    pub model: String,

    pub chat_history: Vec<Message>,

    #[serde(default)]
    pub media_items: Vec<MediaItem>,
}

impl Chat {
    /// Creates an empty chat.
    pub fn new(id: ChatId, title: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            model: model.into(),
            chat_history: Vec::new(),
            media_items: Vec::new(),
        }
    }

    /// Id of the last message in the history, or 0 for an empty chat.
    pub fn last_message_id(&self) -> i64 {
        self.chat_history.last().map(|m| m.id).unwrap_or_default()
    }
}

/// Identity handed in by the authentication collaborator on every call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A chat message in the shape providers expect on the wire
/// (`model` role already mapped to `assistant`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    pub role: &'static str,
    pub content: String,
}

/// Capability flags for a catalog model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelFeatures {
    pub image_generation: bool,
    pub image_upload: bool,
    pub file_upload: bool,
    pub web_search: bool,
    pub streaming: bool,
    pub max_tokens: Option<u32>,
}

impl ModelFeatures {
    /// Text-only chat model: streams, no uploads.
    pub const fn text(max_tokens: Option<u32>) -> Self {
        Self {
            image_generation: false,
            image_upload: false,
            file_upload: false,
            web_search: false,
            streaming: true,
            max_tokens,
        }
    }

    /// Multimodal chat model: streams and accepts uploads.
    pub const fn multimodal(max_tokens: Option<u32>) -> Self {
        Self {
            image_generation: false,
            image_upload: true,
            file_upload: true,
            web_search: false,
            streaming: true,
            max_tokens,
        }
    }

    /// Image-generation model: single-shot, no streaming.
    pub const fn image_generation() -> Self {
        Self {
            image_generation: true,
            image_upload: true,
            file_upload: false,
            web_search: false,
            streaming: false,
            max_tokens: None,
        }
    }
}

/// An entry in the static model catalog. Defined at process start,
/// never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LLMModel {
    pub id: &'static str,
    pub name: &'static str,
    pub provider: ProviderKind,
    pub category: &'static str,
    pub context_length: u32,
    pub features: ModelFeatures,
}
