// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media context resolution and chat/media lifecycle helpers.
//!
//! Providers must distinguish attachments freshly uploaded with the
//! current turn from attachments carried over from earlier turns, so
//! they can phrase prompts like "the first N items are new, the rest are
//! historical". The split is computed purely by comparing each item's
//! `message_id` against one designated message id; no flag is persisted.

use crate::ids::mint_message_id;
use crate::types::{Chat, MediaItem, MediaKind, Message, ProviderMessage, Role};

/// Items attached to the designated message (the current turn).
pub fn current_media(chat: &Chat, message_id: i64) -> Vec<&MediaItem> {
    chat.media_items
        .iter()
        .filter(|m| m.message_id == message_id)
        .collect()
}

/// Items attached to any other message (prior context).
pub fn context_media(chat: &Chat, message_id: i64) -> Vec<&MediaItem> {
    chat.media_items
        .iter()
        .filter(|m| m.message_id != message_id)
        .collect()
}

/// Maps the transcript to provider wire roles (`model` becomes
/// `assistant`), content verbatim.
pub fn format_chat_history(chat: &Chat) -> Vec<ProviderMessage> {
    chat.chat_history
        .iter()
        .map(|msg| ProviderMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Model => "assistant",
            },
            content: msg.content.clone(),
        })
        .collect()
}

/// A file handed in by the upload boundary, already base64-encoded.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub file_data: String,
    pub file_type: String,
}

fn unix_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Appends uploaded files to the chat as media items correlated to
/// `message_id`. Media kind is inferred from the MIME prefix.
/// Returns the ids of the new items.
pub fn attach_files(chat: &mut Chat, message_id: i64, files: Vec<FileUpload>) -> Vec<i64> {
    let mut ids = Vec::with_capacity(files.len());
    for file in files {
        let id = mint_message_id();
        let media_type = if file.file_type.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::File
        };
        chat.media_items.push(MediaItem {
            id,
            message_id,
            file_name: file.file_name,
            file_data: file.file_data,
            file_type: file.file_type,
            media_type,
            timestamp: unix_millis(),
        });
        ids.push(id);
    }
    ids
}

/// Appends a provider-generated image to the chat, correlated to the
/// model message it arrived with.
pub fn attach_generated_image(chat: &mut Chat, message_id: i64, image_data: String) -> i64 {
    let id = mint_message_id();
    chat.media_items.push(MediaItem {
        id,
        message_id,
        file_name: format!("generated-image-{message_id}.png"),
        file_data: image_data,
        file_type: "image/png".into(),
        media_type: MediaKind::Image,
        timestamp: unix_millis(),
    });
    id
}

/// Display text for a message: its content when non-empty, otherwise a
/// summary of its attachments, e.g. `[2 images and 1 file]`.
pub fn media_summary(message: &Message, media_items: &[MediaItem]) -> String {
    let attached: Vec<&MediaItem> = media_items
        .iter()
        .filter(|m| m.message_id == message.id)
        .collect();

    if attached.is_empty() || !message.content.trim().is_empty() {
        return message.content.clone();
    }

    let images = attached
        .iter()
        .filter(|m| m.media_type == MediaKind::Image)
        .count();
    let files = attached.len() - images;

    let mut parts = Vec::new();
    if images > 0 {
        parts.push(format!("{images} image{}", if images > 1 { "s" } else { "" }));
    }
    if files > 0 {
        parts.push(format!("{files} file{}", if files > 1 { "s" } else { "" }));
    }
    if parts.is_empty() {
        "[Media]".to_string()
    } else {
        format!("[{}]", parts.join(" and "))
    }
}
