// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wall-clock-derived id minting for messages and chats.
//!
//! Message ids are UNIX-millisecond timestamps pushed through an atomic
//! max, so rapid calls within one process never repeat or go backwards.
//! Chat ids are time-prefixed hex strings, sortable by creation time.
//! Collisions across processes are an accepted risk at per-user rates.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

use crate::types::ChatId;

static LAST_MESSAGE_ID: AtomicI64 = AtomicI64::new(0);

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Mints a message id: current wall-clock milliseconds, bumped past the
/// previously minted id when the clock has not advanced.
pub fn mint_message_id() -> i64 {
    let now = unix_millis();
    match LAST_MESSAGE_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(now.max(last + 1))
    }) {
        Ok(last) | Err(last) => now.max(last + 1),
    }
}

/// Mints an opaque chat id: 8 hex chars of UNIX seconds followed by
/// 16 random hex chars.
pub fn mint_chat_id() -> ChatId {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as u32;
    let mut rng = rand::thread_rng();
    ChatId(format!(
        "{secs:08x}{:08x}{:08x}",
        rng.r#gen::<u32>(),
        rng.r#gen::<u32>()
    ))
}
