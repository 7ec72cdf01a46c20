// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hugging Face Inference provider adapter for Polychat.
//!
//! Speaks the OpenAI-compatible chat-completions shape through the HF
//! router. Streams for models on the streaming allow-list and falls back
//! to a single-shot completion pushed as one chunk otherwise, preserving
//! the uniform channel contract. Attachments cannot be forwarded; their
//! presence is noted in the prompt instead.

pub mod client;
pub mod types;

use async_trait::async_trait;
use futures::StreamExt;
use polychat_config::HuggingFaceConfig;
use polychat_core::channel::{channel, SendOutcome, ValueSender};
use polychat_core::{media, Chat, Message, PolychatError, ProviderAdapter, ProviderKind};
use tracing::{debug, info};

use crate::client::HuggingFaceClient;
use crate::types::{ChatCompletionRequest, ChatMessage};

/// Chat models known to support token streaming on the router.
const STREAMING_MODELS: &[&str] = &[
    "meta-llama/Llama-2-7b-chat-hf",
    "meta-llama/Llama-2-13b-chat-hf",
    "meta-llama/Llama-2-70b-chat-hf",
    "microsoft/DialoGPT-medium",
    "microsoft/DialoGPT-large",
    "HuggingFaceH4/zephyr-7b-beta",
    "mistralai/Mistral-7B-Instruct-v0.1",
    "mistralai/Mistral-7B-Instruct-v0.3",
    "mistralai/Mixtral-8x7B-Instruct-v0.1",
];

/// Hosted diffusion models with an image-generation capability.
const IMAGE_MODELS: &[&str] = &[
    "stabilityai/stable-diffusion-2-1",
    "stabilityai/stable-diffusion-xl-base-1.0",
    "runwayml/stable-diffusion-v1-5",
];

/// Model used for title generation.
const TITLE_MODEL: &str = "microsoft/DialoGPT-medium";

/// Hugging Face Inference provider.
pub struct HuggingFaceProvider {
    client: HuggingFaceClient,
    max_tokens: u32,
    temperature: f32,
}

impl HuggingFaceProvider {
    /// Creates the provider from configuration.
    ///
    /// API token resolution: `config.huggingface.api_token`, then the
    /// `HF_API_TOKEN` environment variable, else an error.
    pub fn new(config: &HuggingFaceConfig) -> Result<Self, PolychatError> {
        let api_token = resolve_api_token(&config.api_token)?;
        let client = HuggingFaceClient::new(api_token, config.base_url.clone())?;

        info!("Hugging Face provider initialized");

        Ok(Self {
            client,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    /// Creates a provider with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: HuggingFaceClient, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client,
            max_tokens,
            temperature,
        }
    }

    /// Formats the transcript, appending a note about attachments this
    /// model cannot process.
    fn build_messages(&self, chat: &Chat) -> Vec<ChatMessage> {
        let mut messages: Vec<ChatMessage> = media::format_chat_history(chat)
            .into_iter()
            .map(|m| ChatMessage {
                role: m.role.to_string(),
                content: m.content,
            })
            .collect();

        let last_id = chat.last_message_id();
        let current = media::current_media(chat, last_id);
        let context = media::context_media(chat, last_id);

        debug!(
            current = current.len(),
            context = context.len(),
            "attachment counts for request"
        );

        if (!current.is_empty() || !context.is_empty())
            && let Some(last) = messages.last_mut()
        {
            last.content.push_str(&format!(
                "\n\n[Note: User has {} new attachments and {} previous attachments in \
                 this conversation, but this model cannot process them directly.]",
                current.len(),
                context.len()
            ));
        }

        messages
    }
}

#[async_trait]
impl ProviderAdapter for HuggingFaceProvider {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    async fn send_message(
        &self,
        model_id: &str,
        chat: &Chat,
    ) -> Result<SendOutcome, PolychatError> {
        let request = ChatCompletionRequest {
            model: model_id.to_string(),
            messages: self.build_messages(chat),
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
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: format!(
                    "Create a short, descriptive title for a conversation that starts \
                     with: \"{}\". Respond with only the title, no quotes or extra text.",
                    user_message.content
                ),
            }],
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
        STREAMING_MODELS.contains(&model_id)
    }
}

/// Forwards upstream deltas to the channel as they arrive.
async fn run_streaming(
    client: HuggingFaceClient,
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
    client: HuggingFaceClient,
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

/// Resolves the API token from config or environment.
fn resolve_api_token(config_token: &Option<String>) -> Result<String, PolychatError> {
    if let Some(token) = config_token
        && !token.is_empty()
    {
        return Ok(token.clone());
    }

    std::env::var("HF_API_TOKEN").map_err(|_| {
        PolychatError::Config(
            "Hugging Face API token not found. Set huggingface.api_token in config or the HF_API_TOKEN environment variable.".into(),
        )
    })
}
