// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait: the uniform contract every upstream AI
//! service integration implements.

use async_trait::async_trait;

use crate::channel::SendOutcome;
use crate::error::PolychatError;
use crate::types::{Chat, Message, ProviderKind};

/// Adapter for one upstream AI service family.
///
/// Adapters are stateless with respect to individual requests but hold a
/// long-lived upstream client handle, so one instance is constructed per
/// process and reused for all calls.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + 'static {
    /// Human-readable adapter name.
    fn name(&self) -> &str;

    /// Which service family this adapter wraps.
    fn kind(&self) -> ProviderKind;

    /// Sends the conversation to the upstream service and returns channel
    /// handles immediately; chunk production happens in a detached task.
    ///
    /// Upstream failures after the channels exist are delivered through
    /// the channel error path, never as a late `Err`. Only failures
    /// before any channel is created (payload construction) surface
    /// synchronously. A `model_id` this adapter does not recognize is
    /// passed through verbatim: routing correctness is the registry's
    /// concern, not the adapter's.
    async fn send_message(
        &self,
        model_id: &str,
        chat: &Chat,
    ) -> Result<SendOutcome, PolychatError>;

    /// Generates a short chat title from the user's first message.
    ///
    /// Optional capability: the default returns
    /// [`PolychatError::Unsupported`]. Callers should fall back to a
    /// default title or route through an adapter that supports it.
    async fn generate_title(
        &self,
        _model_id: &str,
        _user_message: &Message,
    ) -> Result<String, PolychatError> {
        Err(PolychatError::Unsupported(format!(
            "{} does not implement title generation",
            self.name()
        )))
    }

    /// True when [`ProviderAdapter::generate_title`] is implemented.
    fn supports_title_generation(&self) -> bool {
        false
    }

    /// Pure capability predicate: can this model produce images?
    fn supports_image_generation(&self, _model_id: &str) -> bool {
        false
    }

    /// Pure capability predicate: does this model stream tokens?
    fn supports_streaming(&self, _model_id: &str) -> bool {
        false
    }

    /// Pure capability predicate: does this model accept image input?
    fn supports_vision(&self, _model_id: &str) -> bool {
        false
    }
}
