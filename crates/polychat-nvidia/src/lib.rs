// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NVIDIA NIM provider adapter for Polychat.
//!
//! NIM exposes an OpenAI-compatible chat-completions API. Vision models
//! receive the current turn's images as structured content parts with
//! base64 data URLs; all other models get the plain transcript.

pub mod client;
pub mod types;

use async_trait::async_trait;
use futures::StreamExt;
use polychat_config::NvidiaConfig;
use polychat_core::channel::{channel, SendOutcome, ValueSender};
use polychat_core::{media, Chat, MediaKind, Message, PolychatError, ProviderAdapter, ProviderKind};
use tracing::{debug, info};

use crate::client::NvidiaClient;
use crate::types::{ChatCompletionRequest, ChatMessage, ContentPart, MessageContent};

/// Vision models that accept image content parts.
const VISION_MODELS: &[&str] = &[
    "meta/llama-3.2-11b-vision-instruct",
    "meta/llama-3.2-90b-vision-instruct",
    "microsoft/phi-3-vision-128k-instruct",
];

/// Hosted diffusion models with an image-generation capability.
const IMAGE_MODELS: &[&str] = &[
    "stabilityai/stable-diffusion-xl",
    "stabilityai/stable-diffusion-3-medium",
];

/// Model used for title generation.
const TITLE_MODEL: &str = "meta/llama-3.1-8b-instruct";

/// NVIDIA NIM provider.
pub struct NvidiaProvider {
    client: NvidiaClient,
    max_tokens: u32,
    temperature: f32,
}

impl NvidiaProvider {
    /// Creates the provider from configuration.
    ///
    /// API key resolution: `config.nvidia.api_key`, then the
    /// `NVIDIA_API_KEY` environment variable, else an error.
    pub fn new(config: &NvidiaConfig) -> Result<Self, PolychatError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = NvidiaClient::new(api_key, config.base_url.clone())?;

        info!("NVIDIA provider initialized");

        Ok(Self {
            client,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Creates a provider with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: NvidiaClient, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client,
            max_tokens,
            temperature,
        }
    }

    /// Formats the transcript. For vision models with current-turn
    /// images, the last message becomes structured parts carrying the
    /// text plus each image as a data URL.
    fn build_messages(&self, model_id: &str, chat: &Chat) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = media::format_chat_history(chat)
            .into_iter()
            .map(|m| ChatMessage::text(m.role, m.content))
            .collect();

        let last_id = chat.last_message_id();
        let current = media::current_media(chat, last_id);

        debug!(
            current = current.len(),
            context = media::context_media(chat, last_id).len(),
            "attachment counts for request"
        );

        if self.supports_vision(model_id)
            && !current.is_empty()
            && let Some(last) = messages.last_mut()
        {
            let images: Vec<ContentPart> = current
                .iter()
                .filter(|m| m.media_type == MediaKind::Image)
                .map(|m| ContentPart::data_url(&m.file_type, &m.file_data))
                .collect();

            if !images.is_empty() {
                let text = match &last.content {
                    MessageContent::Text(t) => t.clone(),
                    MessageContent::Parts(_) => String::new(),
                };
                let mut parts = vec![ContentPart::Text { text }];
                parts.extend(images);
                last.content = MessageContent::Parts(parts);
            }
        }

        messages
    }
}

#[async_trait]
impl ProviderAdapter for NvidiaProvider {
    fn name(&self) -> &str {
        "nvidia"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Nvidia
    }

    async fn send_message(
        &self,
        model_id: &str,
        chat: &Chat,
    ) -> Result<SendOutcome, PolychatError> {
        let request = ChatCompletionRequest {
            model: model_id.to_string(),
            messages: self.build_messages(model_id, chat),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };

        let client = self.client.clone();
        let streaming = self.supports_streaming(model_id);
        let (tx, rx) = channel();

        tokio::spawn(async move {
            if streaming {
                run_streaming(client, request, tx).await;
            } else {
                run_single_shot(client, request, tx).await;
            }
        });

        Ok(SendOutcome {
            stream: rx,
            image: None,
        })
    }

    async fn generate_title(
        &self,
        _model_id: &str,
        user_message: &Message,
    ) -> Result<String, PolychatError> {
        let request = ChatCompletionRequest {
            model: TITLE_MODEL.to_string(),
            messages: vec![ChatMessage::text(
                "user",
                format!(
                    "Create a short, descriptive title for a conversation that starts \
                     with: \"{}\". Respond with only the title, no quotes or extra text.",
                    user_message.content
                ),
            )],
            max_tokens: 50,
            temperature: 0.3,
            stream: false,
        };

        let response = self.client.chat_completion(&request).await?;
        let title = response.content().unwrap_or_default().trim().to_string();
        Ok(if title.is_empty() {
            "New Chat".to_string()
        } else {
            title
        })
    }

    fn supports_title_generation(&self) -> bool {
        true
    }

    fn supports_image_generation(&self, model_id: &str) -> bool {
        IMAGE_MODELS.contains(&model_id)
    }

    fn supports_streaming(&self, model_id: &str) -> bool {
        !self.supports_image_generation(model_id)
    }

    fn supports_vision(&self, model_id: &str) -> bool {
        VISION_MODELS.contains(&model_id)
    }
}

/// Forwards upstream deltas to the channel as they arrive.
async fn run_streaming(
    client: NvidiaClient,
    request: ChatCompletionRequest,
    tx: ValueSender<String>,
) {
    match client.chat_completion_stream(&request).await {
        Ok(mut stream) => {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(chunk) => {
                        if let Some(delta) = chunk.delta() {
                            tx.update(delta.to_string());
                        }
                    }
                    Err(err) => {
                        tx.error(err);
                        return;
                    }
                }
            }
            tx.done();
        }
        Err(err) => tx.error(err),
    }
}

/// Fetches the whole completion and pushes it as a single chunk.
async fn run_single_shot(
    client: NvidiaClient,
    request: ChatCompletionRequest,
    tx: ValueSender<String>,
) {
    match client.chat_completion(&request).await {
        Ok(response) => {
            if let Some(content) = response.content() {
                tx.update(content.to_string());
            }
            tx.done();
        }
        Err(err) => tx.error(err),
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, PolychatError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("NVIDIA_API_KEY").map_err(|_| {
        PolychatError::Config(
            "NVIDIA API key not found. Set nvidia.api_key in config or the NVIDIA_API_KEY environment variable.".into(),
        )
    })
}
