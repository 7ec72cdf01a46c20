// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Polychat multi-provider chat engine.
//!
//! This crate provides the shared data model, error taxonomy, provider
//! adapter trait, persistence collaborator trait, streaming value
//! channel, media context resolver, id minting, and the static model
//! catalog. Provider crates implement [`ProviderAdapter`] against these
//! definitions.

pub mod catalog;
pub mod channel;
pub mod error;
pub mod ids;
pub mod media;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use channel::{channel, SendOutcome, ValueSender, ValueStream};
pub use error::PolychatError;
pub use traits::{ChatStore, ProviderAdapter};
pub use types::{
    Chat, ChatId, LLMModel, MediaItem, MediaKind, Message, ModelFeatures, ProviderKind,
    ProviderMessage, Role, User,
};
