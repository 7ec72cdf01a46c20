// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Hugging Face OpenAI-compatible chat-completions
//! router, with SSE streaming and transient error retry.

use std::pin::Pin;
use std::time::Duration;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use polychat_core::PolychatError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse};

/// HTTP client for Hugging Face chat completions.
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl HuggingFaceClient {
    /// Creates a new client with bearer-token authentication.
    pub fn new(api_token: String, base_url: String) -> Result<Self, PolychatError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_str(&format!("Bearer {api_token}")).map_err(|e| {
                PolychatError::Config(format!("invalid API token header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| PolychatError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            max_retries: 1,
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Sends a non-streaming chat completion.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second delay.
    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, PolychatError> {
        let mut req = request.clone();
        req.stream = false;

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(self.url())
                .json(&req)
                .send()
                .await
                .map_err(|e| PolychatError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, model = req.model, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| PolychatError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&body).map_err(|e| PolychatError::Provider {
                    message: format!("failed to parse API response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(PolychatError::provider(format!(
                    "API returned {status}: {body}"
                )));
                continue;
            }

            return Err(decode_error(status, response).await);
        }

        Err(last_error
            .unwrap_or_else(|| PolychatError::provider("completion request failed after retries")))
    }

    /// Sends a streaming chat completion and returns the chunk stream.
    ///
    /// The upstream terminates the SSE stream with a `[DONE]` sentinel,
    /// which is swallowed here. On transient errors (429, 500, 503),
    /// retries once after a 1-second delay.
    pub async fn chat_completion_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<
        Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, PolychatError>> + Send>>,
        PolychatError,
    > {
        let mut req = request.clone();
        req.stream = true;

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying streaming request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(self.url())
                .json(&req)
                .send()
                .await
                .map_err(|e| PolychatError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, model = req.model, "streaming response received");

            if status.is_success() {
                return Ok(parse_chunk_stream(response));
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(PolychatError::provider(format!(
                    "API returned {status}: {body}"
                )));
                continue;
            }

            return Err(decode_error(status, response).await);
        }

        Err(last_error
            .unwrap_or_else(|| PolychatError::provider("streaming request failed after retries")))
    }
}

/// Parses an SSE response into chat-completion chunks, dropping the
/// `[DONE]` sentinel.
fn parse_chunk_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<ChatCompletionChunk, PolychatError>> + Send>> {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = event.data.trim();
                if data.is_empty() || data == "[DONE]" {
                    return None;
                }
                Some(
                    serde_json::from_str::<ChatCompletionChunk>(data).map_err(|e| {
                        PolychatError::Provider {
                            message: format!("failed to parse stream chunk: {e}"),
                            source: Some(Box::new(e)),
                        }
                    }),
                )
            }
            Err(e) => Some(Err(PolychatError::Provider {
                message: format!("SSE stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}

/// Decodes a non-success response into a provider error.
async fn decode_error(status: reqwest::StatusCode, response: reqwest::Response) -> PolychatError {
    let body = response.text().await.unwrap_or_default();
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
        format!(
            "Hugging Face API error ({}): {}",
            api_err.error.type_.as_deref().unwrap_or("unknown"),
            api_err.error.message
        )
    } else {
        format!("API returned {status}: {body}")
    };
    PolychatError::provider(message)
}

/// True for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> HuggingFaceClient {
        HuggingFaceClient::new("hf_test_token".into(), base_url.to_string()).unwrap()
    }

    fn test_request(stream: bool) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "mistralai/Mistral-7B-Instruct-v0.3".into(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
            max_tokens: 1000,
            temperature: 0.7,
            stream,
        }
    }

    #[tokio::test]
    async fn completion_success() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi!"}}]
        });
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer hf_test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let resp = client.chat_completion(&test_request(false)).await.unwrap();
        assert_eq!(resp.content(), Some("Hi!"));
    }

    #[tokio::test]
    async fn completion_retries_on_429() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "After retry"}}]
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let resp = client.chat_completion(&test_request(false)).await.unwrap();
        assert_eq!(resp.content(), Some("After retry"));
    }

    #[tokio::test]
    async fn completion_fails_on_401_with_error_body() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "error": {"message": "Invalid token", "type": "invalid_request_error"}
        });
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(&body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.chat_completion(&test_request(false)).await.unwrap_err();
        assert!(err.to_string().contains("Invalid token"));
    }

    #[tokio::test]
    async fn stream_yields_chunks_and_swallows_done() {
        let server = MockServer::start().await;
        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"index\":0}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"},\"index\":0}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut stream = client
            .chat_completion_stream(&test_request(true))
            .await
            .unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap().delta(), Some("Hel"));
        assert_eq!(stream.next().await.unwrap().unwrap().delta(), Some("lo"));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn stream_fails_fast_on_403() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.chat_completion_stream(&test_request(true)).await;
        assert!(result.is_err());
    }
}
