//! Long-lived consumption of the push stream for one chat session.
//!
//! The client owns a background task that connects, decodes frames and
//! forwards them as [`StreamNotice`]s. On transport failure it reports
//! `Disconnected`, waits according to the [`ReconnectPolicy`] and subscribes
//! again; every subscription starts with a fresh history snapshot from the
//! server, so the message store converges back to server truth.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    domain::{
        events::{AppEvent, StreamNotice},
        session::{ChatId, SessionToken},
        status::SessionStatus,
    },
    protocol::stream_event::decode_event,
};

use super::{
    connector::{EventStreamConnector, TransportError},
    reconnect::ReconnectPolicy,
    status_tracker::StatusTracker,
};

const STREAM_OPENED: &str = "STREAM_OPENED";
const STREAM_CONNECTED: &str = "STREAM_CONNECTED";
const STREAM_DISCONNECTED: &str = "STREAM_DISCONNECTED";
const STREAM_PAYLOAD_DROPPED: &str = "STREAM_PAYLOAD_DROPPED";
const STREAM_CLOSED: &str = "STREAM_CLOSED";

/// Parameters of one subscription.
#[derive(Debug, Clone)]
pub struct StreamSubscription {
    pub chat_id: ChatId,
    pub token: SessionToken,
    pub policy: ReconnectPolicy,
}

#[derive(Debug)]
pub struct StreamClient {
    tracker: StatusTracker,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl StreamClient {
    /// Spawns the consumption task on the current runtime.
    pub fn open(
        connector: Arc<dyn EventStreamConnector>,
        subscription: StreamSubscription,
        sink: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let tracker = StatusTracker::default();
        let (stop_tx, stop_rx) = watch::channel(false);

        tracing::info!(
            code = STREAM_OPENED,
            chat_id = %subscription.chat_id,
            "push stream opened"
        );

        let worker = StreamWorker {
            connector,
            subscription,
            tracker: tracker.clone(),
            sink,
        };
        let task = tokio::spawn(worker.run(stop_rx));

        Self {
            tracker,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.tracker.snapshot()
    }

    /// Stops delivery and releases the task. Safe to call more than once.
    pub fn close(&mut self) {
        let Some(stop_tx) = self.stop_tx.take() else {
            return;
        };

        let _ = stop_tx.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.tracker.on_closed();

        tracing::info!(code = STREAM_CLOSED, "push stream closed");
    }
}

impl Drop for StreamClient {
    fn drop(&mut self) {
        self.close();
    }
}

enum SessionEnd {
    Dropped(String),
    SinkClosed,
}

struct StreamWorker {
    connector: Arc<dyn EventStreamConnector>,
    subscription: StreamSubscription,
    tracker: StatusTracker,
    sink: mpsc::UnboundedSender<AppEvent>,
}

impl StreamWorker {
    async fn run(self, mut stop_rx: watch::Receiver<bool>) {
        let mut attempt: u32 = 0;

        loop {
            if !self.publish(self.tracker.on_connecting()) {
                return;
            }

            let end = tokio::select! {
                _ = wait_for_stop(&mut stop_rx) => return,
                end = self.consume(&mut attempt) => end,
            };

            let reason = match end {
                SessionEnd::Dropped(reason) => reason,
                SessionEnd::SinkClosed => return,
            };

            if !self.publish(self.tracker.on_disconnected(&reason)) {
                return;
            }

            let delay = self.subscription.policy.delay_for(attempt);
            attempt = attempt.saturating_add(1);
            tracing::warn!(
                code = STREAM_DISCONNECTED,
                error = %reason,
                attempt,
                retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "push stream dropped; reconnect scheduled"
            );

            tokio::select! {
                _ = wait_for_stop(&mut stop_rx) => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    async fn consume(&self, attempt: &mut u32) -> SessionEnd {
        let mut stream = match self.connector.connect(&self.subscription.chat_id).await {
            Ok(stream) => stream,
            Err(error) => return SessionEnd::Dropped(error.to_string()),
        };

        *attempt = 0;
        if !self.publish(self.tracker.on_connected()) {
            return SessionEnd::SinkClosed;
        }
        tracing::info!(
            code = STREAM_CONNECTED,
            chat_id = %self.subscription.chat_id,
            "push stream connected"
        );

        while let Some(item) = stream.next().await {
            let payload = match item {
                Ok(payload) => payload,
                Err(error) => return SessionEnd::Dropped(error.to_string()),
            };

            match decode_event(&payload) {
                Ok(event) => {
                    let notice = StreamNotice::Event {
                        token: self.subscription.token,
                        event,
                    };
                    if self.sink.send(AppEvent::Stream(notice)).is_err() {
                        return SessionEnd::SinkClosed;
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        code = STREAM_PAYLOAD_DROPPED,
                        error = %error,
                        payload_len = payload.len(),
                        "dropping malformed stream payload"
                    );
                }
            }
        }

        SessionEnd::Dropped(TransportError::Closed.to_string())
    }

    fn publish(&self, status: SessionStatus) -> bool {
        let notice = StreamNotice::Status {
            token: self.subscription.token,
            status,
        };
        self.sink.send(AppEvent::Stream(notice)).is_ok()
    }
}

async fn wait_for_stop(stop_rx: &mut watch::Receiver<bool>) {
    loop {
        if *stop_rx.borrow() {
            return;
        }
        if stop_rx.changed().await.is_err() {
            return;
        }
    }
}
