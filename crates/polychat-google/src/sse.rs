// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE parser for `streamGenerateContent?alt=sse` responses.
//!
//! Gemini streaming emits unnamed SSE events whose `data` payload is one
//! [`GenerateContentResponse`] chunk each; the stream simply ends after
//! the last chunk.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use polychat_core::PolychatError;

use crate::types::GenerateContentResponse;

/// Parses a reqwest streaming response into a stream of response chunks.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, PolychatError>> + Send>> {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => {
                if event.data.is_empty() {
                    return None;
                }
                Some(
                    serde_json::from_str::<GenerateContentResponse>(&event.data).map_err(|e| {
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
