// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence collaborator interface. The core treats storage as a
//! black box: it receives chat snapshots, operates on them, and hands
//! back new snapshots for the store to reconcile.

use async_trait::async_trait;

use crate::error::PolychatError;
use crate::ids;
use crate::types::{Chat, ChatId, User};

/// Async chat persistence, implemented outside the core.
#[async_trait]
pub trait ChatStore: Send + Sync + 'static {
    /// Returns every chat owned by the given user.
    async fn fetch_chats_by_user(&self, email: &str) -> Result<Vec<Chat>, PolychatError>;

    /// Persists the chat snapshot for the given user, upserting by id.
    async fn save_chat(&self, chat: &Chat, user: &User) -> Result<(), PolychatError>;

    /// Mints an identifier for a new chat. The default uses the local
    /// time-ordered generator; stores backed by an engine with native
    /// ids may override.
    async fn new_chat_id(&self) -> Result<ChatId, PolychatError> {
        Ok(ids::mint_chat_id())
    }
}
