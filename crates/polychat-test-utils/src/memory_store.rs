// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`ChatStore`] for integration tests.

use std::collections::HashMap;

use async_trait::async_trait;
use polychat_core::{Chat, ChatStore, PolychatError, User};
use tokio::sync::Mutex;

/// Stores chats per user email in a map; upserts by chat id.
#[derive(Default)]
pub struct MemoryStore {
    chats: Mutex<HashMap<String, Vec<Chat>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored chats across all users.
    pub async fn chat_count(&self) -> usize {
        self.chats.lock().await.values().map(Vec::len).sum()
    }
}

fn owner_key(user: &User) -> String {
    user.email.clone().unwrap_or_else(|| "anonymous".to_string())
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn fetch_chats_by_user(&self, email: &str) -> Result<Vec<Chat>, PolychatError> {
        Ok(self
            .chats
            .lock()
            .await
            .get(email)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_chat(&self, chat: &Chat, user: &User) -> Result<(), PolychatError> {
        let mut chats = self.chats.lock().await;
        let owned = chats.entry(owner_key(user)).or_default();
        match owned.iter_mut().find(|c| c.id == chat.id) {
            Some(existing) => *existing = chat.clone(),
            None => owned.push(chat.clone()),
        }
        Ok(())
    }
}
