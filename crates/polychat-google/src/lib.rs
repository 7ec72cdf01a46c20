// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for Polychat.
//!
//! Implements [`ProviderAdapter`] over the Gemini REST API: streamed
//! text for chat models, a single non-streaming multipart response for
//! image-generation models, and title generation.

pub mod client;
pub mod sse;
pub mod types;

use async_trait::async_trait;
use futures::StreamExt;
use polychat_config::GoogleConfig;
use polychat_core::channel::{channel, SendOutcome, ValueSender};
use polychat_core::{media, Chat, Message, PolychatError, ProviderAdapter, ProviderKind};
use tracing::{debug, info};

use crate::client::GoogleClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part};

/// Google Gemini provider.
///
/// Holds a pooled HTTP client built once at construction; stateless per
/// request.
pub struct GoogleProvider {
    client: GoogleClient,
    title_model: String,
}

impl GoogleProvider {
    /// Creates the provider from configuration.
    ///
    /// API key resolution: `config.google.api_key`, then the
    /// `GOOGLE_API_KEY` environment variable, else an error.
    pub fn new(config: &GoogleConfig) -> Result<Self, PolychatError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GoogleClient::new(api_key, config.base_url.clone())?;

        info!(title_model = config.title_model, "Google provider initialized");

        Ok(Self {
            client,
            title_model: config.title_model.clone(),
        })
    }

    /// Creates a provider with an existing client (for testing).
    #[cfg(test)]
    fn with_client(client: GoogleClient, title_model: String) -> Self {
        Self {
            client,
            title_model,
        }
    }

    /// Builds the single user turn: a context preamble followed by the
    /// current turn's inline attachments, then prior-context attachments.
    fn build_user_content(&self, chat: &Chat, image_model: bool) -> Result<Content, PolychatError> {
        let last_id = chat.last_message_id();
        let current = media::current_media(chat, last_id);
        let context = media::context_media(chat, last_id);

        let history = serde_json::to_string(&chat.chat_history).map_err(|e| {
            PolychatError::Internal(format!("failed to serialize chat history: {e}"))
        })?;

        let mut preamble = format!(
            "This is the context of user and ai assistant conversation. {history} \
             The first {} inline data elements are new attachments from the most recent \
             message, the other {} are previous attachments. When the user references \
             attachments in the prompt of the most recent message, they are likely \
             referring to the new set of attachments. Continue the conversation by \
             answering the most recent message.",
            current.len(),
            context.len()
        );
        if image_model {
            preamble.push_str(
                " (You are an image model so make sure you output images if user asks \
                 and cross context from previous prompts unless the user specifically \
                 says so)",
            );
        }

        debug!(
            current = current.len(),
            context = context.len(),
            "sending media items with request"
        );

        let mut parts = vec![Part::text(preamble)];
        parts.extend(
            current
                .iter()
                .chain(context.iter())
                .map(|m| Part::inline(m.file_type.clone(), m.file_data.clone())),
        );

        Ok(Content::user(parts))
    }
}

#[async_trait]
impl ProviderAdapter for GoogleProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    async fn send_message(
        &self,
        model_id: &str,
        chat: &Chat,
    ) -> Result<SendOutcome, PolychatError> {
        let image_model = self.supports_image_generation(model_id);
        let request = GenerateContentRequest {
            contents: vec![self.build_user_content(chat, image_model)?],
            generation_config: image_model.then(GenerationConfig::text_and_image),
        };

        let client = self.client.clone();
        let model = model_id.to_string();
        let (text_tx, text_rx) = channel();

        if image_model {
            let (image_tx, image_rx) = channel();
            tokio::spawn(run_image_generation(client, model, request, text_tx, image_tx));
            Ok(SendOutcome {
                stream: text_rx,
                image: Some(image_rx),
            })
        } else {
            tokio::spawn(run_streaming(client, model, request, text_tx));
            Ok(SendOutcome {
                stream: text_rx,
                image: None,
            })
        }
    }

    async fn generate_title(
        &self,
        _model_id: &str,
        user_message: &Message,
    ) -> Result<String, PolychatError> {
        let prompt = format!(
            "Using this initial user message \"{}\" output a singular title for this \
             User to AI chat instance, ONLY RESPOND WITH TITLE",
            user_message.content
        );
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(prompt)])],
            generation_config: None,
        };
        let response = self.client.generate(&self.title_model, &request).await?;
        Ok(response.text().trim().to_string())
    }

    fn supports_title_generation(&self) -> bool {
        true
    }

    fn supports_image_generation(&self, model_id: &str) -> bool {
        model_id.contains("image-generation")
    }

    fn supports_streaming(&self, model_id: &str) -> bool {
        !model_id.contains("image-generation")
    }

    fn supports_vision(&self, _model_id: &str) -> bool {
        // Every Gemini chat model accepts inline media.
        true
    }
}

/// Streams text chunks from the upstream token stream into the channel.
async fn run_streaming(
    client: GoogleClient,
    model: String,
    request: GenerateContentRequest,
    tx: ValueSender<String>,
) {
    match client.stream_generate(&model, &request).await {
        Ok(mut stream) => {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(chunk) => {
                        let text = chunk.text();
                        if !text.is_empty() {
                            tx.update(text);
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

/// Requests one multipart response and routes its parts: text parts to
/// the text channel, inline-data parts to the image channel. Both
/// channels are finalized together.
async fn run_image_generation(
    client: GoogleClient,
    model: String,
    request: GenerateContentRequest,
    text_tx: ValueSender<String>,
    image_tx: ValueSender<String>,
) {
    match client.generate(&model, &request).await {
        Ok(response) => {
            for part in response.parts() {
                if let Some(text) = &part.text {
                    text_tx.update(text.clone());
                } else if let Some(inline) = &part.inline_data {
                    image_tx.update(inline.data.clone());
                }
            }
            text_tx.done();
            image_tx.done();
        }
        Err(err) => {
            let message = err.to_string();
            text_tx.error(err);
            image_tx.error(PolychatError::provider(message));
        }
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, PolychatError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("GOOGLE_API_KEY").map_err(|_| {
        PolychatError::Config(
            "Google API key not found. Set google.api_key in config or the GOOGLE_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polychat_core::{ChatId, MediaItem, MediaKind, Role};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_provider(base_url: &str) -> GoogleProvider {
        let client = GoogleClient::new("test-key".into(), base_url.to_string()).unwrap();
        GoogleProvider::with_client(client, "gemini-2.0-flash".into())
    }

    fn media_item(id: i64, message_id: i64) -> MediaItem {
        MediaItem {
            id,
            message_id,
            file_name: format!("file-{id}.png"),
            file_data: "aW1hZ2U=".into(),
            file_type: "image/png".into(),
            media_type: MediaKind::Image,
            timestamp: 0,
        }
    }

    fn chat_with_message(content: &str) -> Chat {
        let mut chat = Chat::new(ChatId("c1".into()), "t", "gemini-2.0-flash");
        chat.chat_history.push(Message::new(100, content, Role::User));
        chat
    }

    #[test]
    fn capability_predicates() {
        let provider = test_provider("http://unused");
        assert!(provider.supports_image_generation("gemini-2.0-flash-preview-image-generation"));
        assert!(!provider.supports_image_generation("gemini-2.0-flash"));
        assert!(provider.supports_streaming("gemini-2.0-flash"));
        assert!(!provider.supports_streaming("gemini-2.0-flash-preview-image-generation"));
        assert!(provider.supports_vision("gemini-2.0-flash"));
        assert!(provider.supports_title_generation());
        // Idempotent: same answer twice.
        assert_eq!(
            provider.supports_streaming("gemini-2.0-flash"),
            provider.supports_streaming("gemini-2.0-flash")
        );
    }

    #[test]
    fn user_content_orders_current_media_before_context() {
        let provider = test_provider("http://unused");
        let mut chat = chat_with_message("look");
        chat.media_items.push(media_item(1, 50)); // context (older message)
        chat.media_items.push(media_item(2, 100)); // current

        let content = provider.build_user_content(&chat, false).unwrap();
        // parts[0] is the preamble; current attachment precedes context.
        assert_eq!(content.parts.len(), 3);
        let preamble = content.parts[0].text.as_ref().unwrap();
        assert!(preamble.contains("The first 1 inline data elements"));
        assert!(preamble.contains("the other 1 are previous attachments"));
        assert!(content.parts[1].inline_data.is_some());
        assert!(content.parts[2].inline_data.is_some());
    }

    #[test]
    fn image_model_preamble_carries_image_instruction() {
        let provider = test_provider("http://unused");
        let chat = chat_with_message("draw a cat");
        let content = provider.build_user_content(&chat, true).unwrap();
        let preamble = content.parts[0].text.as_ref().unwrap();
        assert!(preamble.contains("You are an image model"));
    }

    #[test]
    fn resolve_api_key_from_config() {
        assert_eq!(
            resolve_api_key(&Some("AIza-123".into())).unwrap(),
            "AIza-123"
        );
    }

    #[test]
    fn resolve_api_key_missing_is_config_error() {
        // Empty config key falls through to the env var, which may or may
        // not be set in the test environment.
        if let Err(err) = resolve_api_key(&Some(String::new())) {
            assert!(err.to_string().contains("API key not found"));
        }
    }

    #[tokio::test]
    async fn send_message_streams_chunks_in_order() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Hello\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\", world\"}]}}]}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:streamGenerateContent"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let chat = chat_with_message("hi");
        let outcome = provider.send_message("gemini-2.0-flash", &chat).await.unwrap();
        assert!(outcome.image.is_none());

        let text = outcome.stream.collect_text().await.unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[tokio::test]
    async fn send_message_image_generation_routes_parts_to_both_channels() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here is your image."},
                        {"inlineData": {"mimeType": "image/png", "data": "cGl4ZWxz"}}
                    ]
                },
                "finishReason": "STOP"
            }]
        });
        Mock::given(method("POST"))
            .and(path(
                "/models/gemini-2.0-flash-preview-image-generation:generateContent",
            ))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"responseModalities": ["TEXT", "IMAGE"]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let chat = chat_with_message("draw a cat");
        let outcome = provider
            .send_message("gemini-2.0-flash-preview-image-generation", &chat)
            .await
            .unwrap();

        let image = outcome.image.unwrap();
        let text = outcome.stream.collect_text().await.unwrap();
        assert_eq!(text, "Here is your image.");
        let image_data = image.collect_text().await.unwrap();
        assert_eq!(image_data, "cGl4ZWxz");
    }

    #[tokio::test]
    async fn upstream_auth_failure_surfaces_on_the_channel() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"code": 401, "message": "Invalid credentials", "status": "UNAUTHENTICATED"}
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(&error_body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let chat = chat_with_message("hi");
        let outcome = provider.send_message("gemini-2.0-flash", &chat).await.unwrap();

        let err = outcome.stream.collect_text().await.unwrap_err();
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[tokio::test]
    async fn image_generation_failure_errors_both_channels() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let chat = chat_with_message("draw");
        let outcome = provider
            .send_message("gemini-2.0-flash-preview-image-generation", &chat)
            .await
            .unwrap();

        let image = outcome.image.unwrap();
        assert!(outcome.stream.collect_text().await.is_err());
        assert!(image.collect_text().await.is_err());
    }

    #[tokio::test]
    async fn generate_title_trims_response() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "  Rust Questions \n"}]},
                "finishReason": "STOP"
            }]
        });
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let message = Message::new(1, "how do I borrow?", Role::User);
        let title = provider
            .generate_title("gemini-2.5-flash-preview-05-20", &message)
            .await
            .unwrap();
        assert_eq!(title, "Rust Questions");
    }

    #[tokio::test]
    async fn generate_title_propagates_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("nope"))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let message = Message::new(1, "hello", Role::User);
        assert!(provider.generate_title("gemini-2.0-flash", &message).await.is_err());
    }
}
