// SPDX-FileCopyrightText: 2026 Polychat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming value channel: a single-producer/single-consumer construct
//! that decouples "a value arriving over time" from "a place to obtain
//! the final value".
//!
//! The producer pushes chunks with [`ValueSender::update`] and closes the
//! channel exactly once via [`ValueSender::done`] or [`ValueSender::error`].
//! Both terminal methods take `self` by value, so updating after a
//! terminal state is unrepresentable. Dropping the sender without calling
//! either behaves as `done()`, so no channel is ever left open.
//!
//! The consumer side is a finite, non-restartable asynchronous sequence:
//! chunks arrive in exactly the order they were produced, and after the
//! terminal state is observed (end-of-stream or a single error item)
//! further polls yield nothing.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;

use crate::error::PolychatError;

/// Creates a connected producer/consumer pair.
pub fn channel<T>() -> (ValueSender<T>, ValueStream<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        ValueSender { tx },
        ValueStream {
            rx,
            terminated: false,
        },
    )
}

/// Producer half of a streaming value channel.
#[derive(Debug)]
pub struct ValueSender<T> {
    tx: mpsc::UnboundedSender<Result<T, PolychatError>>,
}

impl<T> ValueSender<T> {
    /// Appends one chunk. A send into an abandoned channel is silently
    /// dropped: production runs to completion whether or not a consumer
    /// is still attached.
    pub fn update(&self, chunk: T) {
        let _ = self.tx.send(Ok(chunk));
    }

    /// Marks the channel terminally successful. No further updates are
    /// possible (this consumes the sender).
    pub fn done(self) {}

    /// Marks the channel terminally failed. No further updates are
    /// possible (this consumes the sender).
    pub fn error(self, err: PolychatError) {
        let _ = self.tx.send(Err(err));
    }
}

/// Consumer half of a streaming value channel.
///
/// Implements [`futures_core::Stream`]; also usable directly via
/// [`ValueStream::recv`]. Once the terminal state has been observed the
/// stream is fused: re-polling yields nothing.
#[derive(Debug)]
pub struct ValueStream<T> {
    rx: mpsc::UnboundedReceiver<Result<T, PolychatError>>,
    terminated: bool,
}

impl<T> ValueStream<T> {
    /// Receives the next chunk, `None` once the channel closed normally.
    /// An error item is yielded at most once; afterwards the stream is
    /// terminated.
    pub async fn recv(&mut self) -> Option<Result<T, PolychatError>> {
        if self.terminated {
            return None;
        }
        match self.rx.recv().await {
            Some(Ok(chunk)) => Some(Ok(chunk)),
            Some(Err(err)) => {
                self.terminated = true;
                self.rx.close();
                Some(Err(err))
            }
            None => {
                self.terminated = true;
                None
            }
        }
    }
}

impl ValueStream<String> {
    /// Drains the channel, concatenating every chunk in order, or returns
    /// the first error observed.
    pub async fn collect_text(mut self) -> Result<String, PolychatError> {
        let mut out = String::new();
        while let Some(item) = self.recv().await {
            out.push_str(&item?);
        }
        Ok(out)
    }
}

impl<T> futures_core::Stream for ValueStream<T> {
    type Item = Result<T, PolychatError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.terminated {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(chunk))) => Poll::Ready(Some(Ok(chunk))),
            Poll::Ready(Some(Err(err))) => {
                this.terminated = true;
                this.rx.close();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.terminated = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// The uniform result of an adapter send: a text channel, plus an image
/// channel when the model generates images. Both reach a terminal state
/// before the turn is considered complete.
#[derive(Debug)]
pub struct SendOutcome {
    /// Incremental text chunks in upstream emission order.
    pub stream: ValueStream<String>,

    /// Incremental base64 image chunks, present only for
    /// image-generation models.
    pub image: Option<ValueStream<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn chunks_arrive_in_order_and_concatenate() {
        let (tx, stream) = channel::<String>();
        let chunks = ["Hello", ", ", "world", "!"];
        for c in chunks {
            tx.update(c.to_string());
        }
        tx.done();

        let text = stream.collect_text().await.unwrap();
        assert_eq!(text, "Hello, world!");
    }

    #[tokio::test]
    async fn error_surfaces_after_partial_chunks() {
        let (tx, mut stream) = channel::<String>();
        tx.update("partial".to_string());
        tx.error(PolychatError::provider("upstream failed"));

        assert_eq!(stream.recv().await.unwrap().unwrap(), "partial");
        let err = stream.recv().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("upstream failed"));
        // Terminal: nothing more, ever.
        assert!(stream.recv().await.is_none());
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn collect_text_returns_first_error() {
        let (tx, stream) = channel::<String>();
        tx.update("will be discarded".to_string());
        tx.error(PolychatError::provider("invalid credentials"));

        let err = stream.collect_text().await.unwrap_err();
        assert!(err.to_string().contains("invalid credentials"));
    }

    #[tokio::test]
    async fn dropping_sender_closes_the_stream() {
        let (tx, mut stream) = channel::<String>();
        tx.update("only".to_string());
        drop(tx);

        assert_eq!(stream.recv().await.unwrap().unwrap(), "only");
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn consumer_sees_chunks_pushed_from_a_background_task() {
        let (tx, mut stream) = channel::<String>();
        let producer = tokio::spawn(async move {
            for i in 0..5 {
                tx.update(format!("chunk-{i}"));
                tokio::task::yield_now().await;
            }
            tx.done();
        });

        let mut seen = Vec::new();
        while let Some(item) = stream.recv().await {
            seen.push(item.unwrap());
        }
        producer.await.unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], "chunk-0");
        assert_eq!(seen[4], "chunk-4");
    }

    #[tokio::test]
    async fn stream_impl_matches_recv_semantics() {
        let (tx, stream) = channel::<i32>();
        tx.update(1);
        tx.update(2);
        tx.done();

        let items: Vec<i32> = stream.map(|r| r.unwrap()).collect().await;
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn update_after_consumer_dropped_is_a_no_op() {
        let (tx, stream) = channel::<String>();
        drop(stream);
        // Production continues without a consumer attached.
        tx.update("discarded".to_string());
        tx.done();
    }

    #[tokio::test]
    async fn empty_channel_terminates_immediately_on_done() {
        let (tx, mut stream) = channel::<String>();
        tx.done();
        assert!(stream.recv().await.is_none());
    }
}
