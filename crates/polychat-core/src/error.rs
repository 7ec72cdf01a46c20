// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the Polychat workspace.

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
#[derive(Debug, Error)]
pub enum PolychatError {
    /// Configuration errors (missing API key, invalid header value).
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream provider errors (API failure, auth, rate limits, malformed payloads).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Persistence collaborator errors.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A capability the adapter does not implement (e.g. title generation).
    #[error("unsupported capability: {0}")]
    Unsupported(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PolychatError {
    /// Shorthand for a provider error carrying only a message.
    pub fn provider(message: impl Into<String>) -> Self {
        PolychatError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
