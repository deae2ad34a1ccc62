//! Opens the push stream for a chat and yields raw event payloads.

use std::{collections::VecDeque, pin::Pin};

use async_trait::async_trait;
use futures_util::{stream, Stream, StreamExt};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use thiserror::Error;
use url::Url;

use crate::{domain::session::ChatId, protocol::sse::SseDecoder};

use super::chat_endpoint;

const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Payloads of dispatched frames, in arrival order.
pub type RawEventStream = Pin<Box<dyn Stream<Item = Result<String, TransportError>> + Send>>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("backend url cannot address chat {chat_id}")]
    InvalidEndpoint { chat_id: String },
    #[error("stream request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("stream request rejected with status {status}")]
    Rejected { status: u16 },
    #[error("stream body read failed: {0}")]
    Body(#[source] reqwest::Error),
    #[error("stream closed by server")]
    Closed,
}

#[async_trait]
pub trait EventStreamConnector: Send + Sync {
    /// Returns once the server acknowledged the subscription.
    async fn connect(&self, chat_id: &ChatId) -> Result<RawEventStream, TransportError>;
}

#[derive(Debug, Clone)]
pub struct SseConnector {
    http: reqwest::Client,
    base_url: Url,
}

impl SseConnector {
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

#[async_trait]
impl EventStreamConnector for SseConnector {
    async fn connect(&self, chat_id: &ChatId) -> Result<RawEventStream, TransportError> {
        let url = chat_endpoint(&self.base_url, chat_id, "stream").ok_or_else(|| {
            TransportError::InvalidEndpoint {
                chat_id: chat_id.to_string(),
            }
        })?;

        let response = self
            .http
            .get(url)
            .header(ACCEPT, EVENT_STREAM_MIME)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(TransportError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::Body));
        Ok(frame_payloads(body))
    }
}

/// Turns a body of byte chunks into a stream of frame payloads.
pub fn frame_payloads<S, B>(body: S) -> RawEventStream
where
    S: Stream<Item = Result<B, TransportError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = (Box::pin(body), SseDecoder::default(), VecDeque::new());

    Box::pin(stream::unfold(
        state,
        |(mut body, mut decoder, mut pending)| async move {
            loop {
                if let Some(payload) = pending.pop_front() {
                    return Some((Ok(payload), (body, decoder, pending)));
                }

                match body.next().await {
                    Some(Ok(chunk)) => {
                        pending.extend(decoder.push(chunk.as_ref()).into_iter().map(|frame| {
                            tracing::trace!(
                                event = frame.event.as_deref().unwrap_or("message"),
                                id = frame.id.as_deref(),
                                "sse frame decoded"
                            );
                            frame.data
                        }));
                    }
                    Some(Err(error)) => return Some((Err(error), (body, decoder, pending))),
                    None => return None,
                }
            }
        },
    ))
}
