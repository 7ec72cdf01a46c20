// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock provider adapter with scripted responses, enabling fast,
//! CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use polychat_core::channel::{channel, SendOutcome};
use polychat_core::{Chat, Message, PolychatError, ProviderAdapter, ProviderKind};

/// One scripted response for a `send_message` call.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSend {
    /// Text chunks pushed in order.
    pub chunks: Vec<String>,

    /// When set, the channel errors with this message after the chunks
    /// instead of finishing.
    pub error: Option<String>,

    /// When set, an image channel is returned carrying this base64
    /// payload as a single chunk.
    pub image: Option<String>,
}

impl ScriptedSend {
    /// A successful text-only send.
    pub fn text(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    /// A send that fails after delivering the given chunks.
    pub fn failing(chunks: &[&str], error: &str) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            error: Some(error.to_string()),
            image: None,
        }
    }

    /// A successful send carrying a generated image.
    pub fn with_image(chunks: &[&str], image: &str) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            error: None,
            image: Some(image.to_string()),
        }
    }
}

/// A mock provider that replays scripted sends and titles from FIFO
/// queues. With an empty queue it produces a default two-chunk response.
///
/// Queues use a `std::sync::Mutex`; guards are never held across await
/// points.
pub struct MockAdapter {
    kind: ProviderKind,
    name: String,
    sends: Arc<Mutex<VecDeque<ScriptedSend>>>,
    titles: Arc<Mutex<VecDeque<Result<String, String>>>>,
    title_capable: bool,
    streaming: bool,
}

impl MockAdapter {
    /// Creates a mock for the given provider kind with empty queues.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            name: format!("mock-{}", kind.to_string().to_lowercase()),
            sends: Arc::new(Mutex::new(VecDeque::new())),
            titles: Arc::new(Mutex::new(VecDeque::new())),
            title_capable: true,
            streaming: true,
        }
    }

    /// Queues a scripted send (builder style).
    pub fn with_send(self, send: ScriptedSend) -> Self {
        self.push_send(send);
        self
    }

    /// Queues a successful title (builder style).
    pub fn with_title(self, title: &str) -> Self {
        self.titles
            .lock()
            .expect("titles lock")
            .push_back(Ok(title.to_string()));
        self
    }

    /// Queues a failing title (builder style).
    pub fn with_title_error(self, message: &str) -> Self {
        self.titles
            .lock()
            .expect("titles lock")
            .push_back(Err(message.to_string()));
        self
    }

    /// Declares the adapter incapable of title generation.
    pub fn without_title_generation(mut self) -> Self {
        self.title_capable = false;
        self
    }

    /// Makes `supports_streaming` report false.
    pub fn without_streaming(mut self) -> Self {
        self.streaming = false;
        self
    }

    /// Queues a scripted send after construction.
    pub fn push_send(&self, send: ScriptedSend) {
        self.sends.lock().expect("sends lock").push_back(send);
    }
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn send_message(
        &self,
        _model_id: &str,
        _chat: &Chat,
    ) -> Result<SendOutcome, PolychatError> {
        let script = self
            .sends
            .lock()
            .expect("sends lock")
            .pop_front()
            .unwrap_or_else(|| ScriptedSend::text(&["mock ", "response"]));

        let (text_tx, text_rx) = channel();
        let image = script.image.clone();
        let (image_tx, image_rx) = if image.is_some() {
            let (tx, rx) = channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        tokio::spawn(async move {
            for chunk in script.chunks {
                text_tx.update(chunk);
                tokio::task::yield_now().await;
            }
            match script.error {
                Some(message) => {
                    text_tx.error(PolychatError::provider(message.clone()));
                    if let Some(tx) = image_tx {
                        tx.error(PolychatError::provider(message));
                    }
                }
                None => {
                    text_tx.done();
                    if let Some(tx) = image_tx {
                        if let Some(data) = image {
                            tx.update(data);
                        }
                        tx.done();
                    }
                }
            }
        });

        Ok(SendOutcome {
            stream: text_rx,
            image: image_rx,
        })
    }

    async fn generate_title(
        &self,
        _model_id: &str,
        _user_message: &Message,
    ) -> Result<String, PolychatError> {
        if !self.title_capable {
            return Err(PolychatError::Unsupported(format!(
                "{} does not implement title generation",
                self.name
            )));
        }
        let scripted = self.titles.lock().expect("titles lock").pop_front();
        match scripted {
            Some(Ok(title)) => Ok(title),
            Some(Err(message)) => Err(PolychatError::provider(message)),
            None => Ok("Mock Chat".to_string()),
        }
    }

    fn supports_title_generation(&self) -> bool {
        self.title_capable
    }

    fn supports_streaming(&self, _model_id: &str) -> bool {
        self.streaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polychat_core::{ChatId, Role};

    fn test_chat() -> Chat {
        let mut chat = Chat::new(ChatId("c".into()), "t", "m");
        chat.chat_history.push(Message::new(1, "hi", Role::User));
        chat
    }

    #[tokio::test]
    async fn default_send_produces_mock_response() {
        let adapter = MockAdapter::new(ProviderKind::Google);
        let outcome = adapter.send_message("any", &test_chat()).await.unwrap();
        assert_eq!(outcome.stream.collect_text().await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn scripted_sends_replay_in_order() {
        let adapter = MockAdapter::new(ProviderKind::Google);
        adapter.push_send(ScriptedSend::text(&["first"]));
        adapter.push_send(ScriptedSend::text(&["second"]));

        let a = adapter.send_message("any", &test_chat()).await.unwrap();
        assert_eq!(a.stream.collect_text().await.unwrap(), "first");
        let b = adapter.send_message("any", &test_chat()).await.unwrap();
        assert_eq!(b.stream.collect_text().await.unwrap(), "second");
    }

    #[tokio::test]
    async fn scripted_error_arrives_after_chunks() {
        let adapter = MockAdapter::new(ProviderKind::Nvidia);
        adapter.push_send(ScriptedSend::failing(&["partial"], "boom"));

        let outcome = adapter.send_message("any", &test_chat()).await.unwrap();
        let mut stream = outcome.stream;
        assert_eq!(stream.recv().await.unwrap().unwrap(), "partial");
        assert!(stream.recv().await.unwrap().is_err());
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn scripted_image_arrives_on_its_own_channel() {
        let adapter = MockAdapter::new(ProviderKind::Google);
        adapter.push_send(ScriptedSend::with_image(&["caption"], "cGl4ZWxz"));

        let outcome = adapter.send_message("any", &test_chat()).await.unwrap();
        let image = outcome.image.expect("image channel");
        assert_eq!(outcome.stream.collect_text().await.unwrap(), "caption");
        assert_eq!(image.collect_text().await.unwrap(), "cGl4ZWxz");
    }

    #[tokio::test]
    async fn title_queue_and_default() {
        let adapter = MockAdapter::new(ProviderKind::Google).with_title("Scripted");
        let msg = Message::new(1, "hi", Role::User);
        assert_eq!(adapter.generate_title("m", &msg).await.unwrap(), "Scripted");
        assert_eq!(adapter.generate_title("m", &msg).await.unwrap(), "Mock Chat");
    }

    #[tokio::test]
    async fn scripted_title_error_propagates() {
        let adapter = MockAdapter::new(ProviderKind::Google).with_title_error("quota exceeded");
        let msg = Message::new(1, "hi", Role::User);
        let err = adapter.generate_title("m", &msg).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn incapable_adapter_reports_unsupported() {
        let adapter = MockAdapter::new(ProviderKind::HuggingFace).without_title_generation();
        assert!(!adapter.supports_title_generation());
        let msg = Message::new(1, "hi", Role::User);
        let err = adapter.generate_title("m", &msg).await.unwrap_err();
        assert!(matches!(err, PolychatError::Unsupported(_)));
    }
}
