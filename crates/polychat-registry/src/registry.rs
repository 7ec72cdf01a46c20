// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The provider registry: one singleton adapter per provider kind,
//! fronted by the same capability contract the adapters expose.

use std::collections::HashMap;
use std::sync::Arc;

use polychat_config::PolychatConfig;
use polychat_core::channel::SendOutcome;
use polychat_core::{Chat, Message, PolychatError, ProviderAdapter, ProviderKind};
use polychat_google::GoogleProvider;
use polychat_huggingface::HuggingFaceProvider;
use polychat_nvidia::NvidiaProvider;
use tracing::debug;

use crate::routes::{resolve, Route};

/// Stateless routing facade over the provider adapters.
///
/// Adapters are constructed once (each holding its pooled upstream
/// client) and reused for every call. The registry never catches adapter
/// errors; it is a pure delegator.
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    /// Builds the registry with the real adapters from configuration.
    ///
    /// Fails if any adapter cannot construct its upstream client (for
    /// example, a missing API key).
    pub fn from_config(config: &PolychatConfig) -> Result<Self, PolychatError> {
        let google: Arc<dyn ProviderAdapter> = Arc::new(GoogleProvider::new(&config.google)?);
        let huggingface: Arc<dyn ProviderAdapter> =
            Arc::new(HuggingFaceProvider::new(&config.huggingface)?);
        let nvidia: Arc<dyn ProviderAdapter> = Arc::new(NvidiaProvider::new(&config.nvidia)?);
        Ok(Self::with_providers([google, huggingface, nvidia]))
    }

    /// Builds the registry from explicit adapter instances, keyed by
    /// their reported kind. Used by tests and embedders.
    pub fn with_providers(
        providers: impl IntoIterator<Item = Arc<dyn ProviderAdapter>>,
    ) -> Self {
        Self {
            providers: providers.into_iter().map(|p| (p.kind(), p)).collect(),
        }
    }

    /// Resolves a model id to its provider and effective model id.
    pub fn resolve(&self, model_id: &str) -> Route {
        resolve(model_id)
    }

    fn provider(&self, kind: ProviderKind) -> Result<&Arc<dyn ProviderAdapter>, PolychatError> {
        self.providers
            .get(&kind)
            .ok_or_else(|| PolychatError::Internal(format!("provider {kind} not registered")))
    }

    /// Routes the send to the resolved adapter.
    pub async fn send_message(
        &self,
        model_id: &str,
        chat: &Chat,
    ) -> Result<SendOutcome, PolychatError> {
        let route = resolve(model_id);
        debug!(provider = %route.provider, model = %route.actual_model_id, "dispatching send");
        self.provider(route.provider)?
            .send_message(&route.actual_model_id, chat)
            .await
    }

    /// Generates a title through the resolved adapter, falling back to
    /// the default (Google) adapter when the resolved one lacks the
    /// capability, so callers never need to check it themselves.
    pub async fn generate_title(
        &self,
        model_id: &str,
        user_message: &Message,
    ) -> Result<String, PolychatError> {
        let route = resolve(model_id);
        let provider = self.provider(route.provider)?;
        if provider.supports_title_generation() {
            return provider
                .generate_title(&route.actual_model_id, user_message)
                .await;
        }

        debug!(provider = %route.provider, "no title capability, falling back to default adapter");
        self.provider(ProviderKind::Google)?
            .generate_title(&route.actual_model_id, user_message)
            .await
    }

    /// Whether the resolved adapter can generate images for this model.
    pub fn supports_image_generation(&self, model_id: &str) -> bool {
        let route = resolve(model_id);
        self.providers
            .get(&route.provider)
            .is_some_and(|p| p.supports_image_generation(&route.actual_model_id))
    }

    /// Whether the resolved adapter streams tokens for this model.
    pub fn supports_streaming(&self, model_id: &str) -> bool {
        let route = resolve(model_id);
        self.providers
            .get(&route.provider)
            .is_some_and(|p| p.supports_streaming(&route.actual_model_id))
    }

    /// Whether the resolved adapter accepts image input for this model.
    pub fn supports_vision(&self, model_id: &str) -> bool {
        let route = resolve(model_id);
        self.providers
            .get(&route.provider)
            .is_some_and(|p| p.supports_vision(&route.actual_model_id))
    }
}
