// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The send-and-respond cycle: chat creation, message append, channel
//! consumption, generated-image reconciliation, and persistence.
//!
//! [`ChatSession`] drives one full turn against the provider registry
//! and hands the materialized chat snapshot to the [`ChatStore`]. Each
//! call owns its own snapshot and channel pair; concurrent sends to the
//! same chat are a caller-level concern and must be serialized at the
//! boundary.

use std::sync::Arc;

use polychat_core::media::{self, FileUpload};
use polychat_core::{ids, Chat, ChatStore, Message, PolychatError, Role, User};
use polychat_registry::ProviderRegistry;
use tracing::{debug, info, warn};

/// Orchestrates chat turns over a registry and a store.
pub struct ChatSession<S> {
    registry: Arc<ProviderRegistry>,
    store: S,
    fallback_title: String,
}

impl<S: ChatStore> ChatSession<S> {
    /// Creates a session with the default fallback title.
    pub fn new(registry: Arc<ProviderRegistry>, store: S) -> Self {
        Self::with_fallback_title(registry, store, "New Chat")
    }

    /// Creates a session with a custom fallback title, used when title
    /// generation fails on chat creation.
    pub fn with_fallback_title(
        registry: Arc<ProviderRegistry>,
        store: S,
        fallback_title: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            store,
            fallback_title: fallback_title.into(),
        }
    }

    /// All chats owned by the given user.
    pub async fn chats(&self, email: &str) -> Result<Vec<Chat>, PolychatError> {
        self.store.fetch_chats_by_user(email).await
    }

    /// Runs one full turn: appends the user message (and uploads),
    /// creates the chat if needed (minting an id and generating a
    /// title), streams the model response into a placeholder message,
    /// reconciles any generated image, and persists the result.
    ///
    /// A provider failure does not fail the turn: the placeholder is
    /// finalized with an error text in place of the response (partial
    /// text is discarded) and the chat is still persisted. Only
    /// persistence failures surface as `Err`.
    pub async fn send(
        &self,
        model_id: &str,
        chat: Option<Chat>,
        text: &str,
        attachments: Vec<FileUpload>,
        user: &User,
    ) -> Result<Chat, PolychatError> {
        let user_message_id = ids::mint_message_id();
        let mut user_message = Message::new(user_message_id, text, Role::User);

        let mut chat = match chat {
            Some(chat) => chat,
            None => {
                let id = self.store.new_chat_id().await?;
                let title = match self.registry.generate_title(model_id, &user_message).await {
                    Ok(title) if !title.trim().is_empty() => title,
                    Ok(_) => self.fallback_title.clone(),
                    Err(err) => {
                        warn!(error = %err, "title generation failed, using fallback");
                        self.fallback_title.clone()
                    }
                };
                info!(chat_id = %id, title = %title, "created chat");
                Chat::new(id, title, model_id)
            }
        };

        user_message.media_ids = media::attach_files(&mut chat, user_message_id, attachments);
        chat.chat_history.push(user_message);

        let placeholder_id = ids::mint_message_id();
        chat.chat_history.push(Message::streaming_placeholder(placeholder_id));

        match self.registry.send_message(model_id, &chat).await {
            Ok(outcome) => {
                let (content, failure) = drain_text(outcome.stream).await;

                let image_data = match outcome.image {
                    Some(stream) => drain_image(stream).await,
                    None => String::new(),
                };

                match failure {
                    Some(err) => {
                        debug!(error = %err, "response channel failed, discarding partial text");
                        finalize_last(&mut chat, format!("Error: {err}"));
                    }
                    None => {
                        finalize_last(&mut chat, content);
                        if !image_data.is_empty() {
                            let media_id =
                                media::attach_generated_image(&mut chat, placeholder_id, image_data);
                            if let Some(last) = chat.chat_history.last_mut() {
                                last.media_ids.push(media_id);
                            }
                        }
                    }
                }
            }
            Err(err) => {
                debug!(error = %err, "send failed before any channel was created");
                finalize_last(&mut chat, format!("Error: {err}"));
            }
        }

        self.store.save_chat(&chat, user).await?;
        Ok(chat)
    }

    /// Records a model switch on the chat and persists it.
    pub async fn set_model(
        &self,
        mut chat: Chat,
        model_id: &str,
        user: &User,
    ) -> Result<Chat, PolychatError> {
        chat.model = model_id.to_string();
        self.store.save_chat(&chat, user).await?;
        Ok(chat)
    }
}

/// Consumes the text channel to completion. Returns the accumulated
/// text and the error, if one terminated the channel.
async fn drain_text(
    mut stream: polychat_core::ValueStream<String>,
) -> (String, Option<PolychatError>) {
    let mut content = String::new();
    let mut failure = None;
    while let Some(item) = stream.recv().await {
        match item {
            Ok(chunk) => content.push_str(&chunk),
            Err(err) => failure = Some(err),
        }
    }
    (content, failure)
}

/// Drains the image channel; an image-channel failure is logged rather
/// than failing the turn (the text channel carries its own copy of the
/// error for image-generation models).
async fn drain_image(mut stream: polychat_core::ValueStream<String>) -> String {
    let mut data = String::new();
    while let Some(item) = stream.recv().await {
        match item {
            Ok(chunk) => data.push_str(&chunk),
            Err(err) => warn!(error = %err, "image channel failed"),
        }
    }
    data
}

/// Finalizes the streaming placeholder: sets its content and clears the
/// streaming flag.
fn finalize_last(chat: &mut Chat, content: String) {
    if let Some(last) = chat.chat_history.last_mut() {
        last.content = content;
        last.is_streaming = false;
    }
}
