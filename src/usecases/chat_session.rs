//! One chat session: the message list, the draft, and the push stream that
//! keeps them in sync with the server.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;

use crate::{
    backend::{
        connector::EventStreamConnector,
        gateway::BackendGateway,
        reconnect::ReconnectPolicy,
        stream_client::{StreamClient, StreamSubscription},
    },
    domain::{
        draft_state::DraftState,
        events::{AppEvent, StreamEvent, StreamNotice, SubmissionReport, SubmitOutcome},
        message::{DeliveryStatus, Message},
        message_store::{MessageStore, StoreChange},
        session::{ChatId, SessionToken},
        status::{ConnectionStatus, SessionStatus},
    },
};

use super::draft_sync::{CommitOutcome, DraftSynchronizer, SubmitRoute};

const STALE_RESULT_DISCARDED: &str = "SESSION_STALE_RESULT_DISCARDED";
const FINAL_DELIVERY_FAILED: &str = "SESSION_FINAL_DELIVERY_FAILED";

/// Collaborators a session is built from.
pub struct SessionDeps {
    pub gateway: Arc<dyn BackendGateway>,
    pub connector: Arc<dyn EventStreamConnector>,
    pub events: mpsc::UnboundedSender<AppEvent>,
    pub debounce: Duration,
    pub reconnect: ReconnectPolicy,
}

pub struct ChatSession {
    chat_id: Option<ChatId>,
    token: SessionToken,
    store: MessageStore,
    draft: DraftSynchronizer,
    stream: Option<StreamClient>,
    status: SessionStatus,
    counterpart_draft: Option<String>,
}

impl ChatSession {
    /// Opens a session. Without a chat id the session runs degraded: local
    /// echo works, nothing touches the network.
    pub fn open(chat_id: Option<ChatId>, deps: SessionDeps) -> Self {
        let token = SessionToken::default().next();
        let mut draft = DraftSynchronizer::new(deps.gateway, deps.events.clone(), deps.debounce);

        let stream = chat_id.as_ref().map(|chat_id| {
            draft.bind(Some(SubmitRoute {
                chat_id: chat_id.clone(),
                token,
            }));
            StreamClient::open(
                deps.connector,
                StreamSubscription {
                    chat_id: chat_id.clone(),
                    token,
                    policy: deps.reconnect,
                },
                deps.events,
            )
        });

        let status = match stream {
            Some(ref stream) => stream.status(),
            None => SessionStatus {
                connection: ConnectionStatus::Disconnected,
                ..SessionStatus::default()
            },
        };

        tracing::info!(
            chat_id = chat_id.as_ref().map(ChatId::as_str).unwrap_or("<none>"),
            "chat session opened"
        );

        Self {
            chat_id,
            token,
            store: MessageStore::default(),
            draft,
            stream,
            status,
            counterpart_draft: None,
        }
    }

    pub fn chat_id(&self) -> Option<&ChatId> {
        self.chat_id.as_ref()
    }

    #[cfg(test)]
    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// Change notifications for the message list.
    pub fn subscribe_messages(&mut self) -> std::sync::mpsc::Receiver<StoreChange> {
        self.store.subscribe()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn draft(&self) -> &DraftState {
        self.draft.draft()
    }

    /// Latest non-final text seen from the other participant.
    pub fn counterpart_draft(&self) -> Option<&str> {
        self.counterpart_draft.as_deref()
    }

    /// True while a draft update is waiting out the debounce delay.
    pub fn has_pending_draft(&self) -> bool {
        self.draft.has_pending_update()
    }

    pub fn edit_draft<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut DraftState) -> bool,
    {
        self.draft.edit(edit);
    }

    pub fn commit_draft(&mut self) -> CommitOutcome {
        self.draft.commit(&mut self.store)
    }

    /// Empties the message list and the draft.
    pub fn clear_all(&mut self) {
        self.store.clear();
        self.draft.discard();
        self.counterpart_draft = None;
    }

    pub fn handle_stream(&mut self, notice: StreamNotice) {
        match notice {
            StreamNotice::Status { token, status } => {
                if self.is_current(token, "status") {
                    self.status = status;
                }
            }
            StreamNotice::Event { token, event } => {
                if self.is_current(token, "event") {
                    self.apply_event(event);
                }
            }
        }
    }

    pub fn handle_submission(&mut self, report: SubmissionReport) {
        if !self.is_current(report.token, "submission") {
            return;
        }

        match (report.is_final, report.outcome) {
            (false, SubmitOutcome::Delivered) => self.draft.record_transmitted(&report.text),
            (false, SubmitOutcome::Failed { .. }) => {}
            (true, SubmitOutcome::Delivered) => {}
            (true, SubmitOutcome::Failed { reason }) => {
                tracing::warn!(
                    code = FINAL_DELIVERY_FAILED,
                    reason = %reason,
                    "final message not delivered; appending failed entry"
                );
                self.store
                    .push_local(&report.text, true, DeliveryStatus::Failed);
            }
        }
    }

    /// Cancels the debounce timer, stops the stream and invalidates every
    /// in-flight result.
    pub fn close(&mut self) {
        self.draft.cancel_pending();
        self.draft.bind(None);
        if let Some(mut stream) = self.stream.take() {
            stream.close();
            self.status = stream.status();
        }
        self.token = self.token.next();
    }

    fn apply_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::History(mut messages) => {
                messages.reverse();
                self.counterpart_draft = None;
                self.store.apply_history(messages);
            }
            StreamEvent::Message(message) => {
                if message.is_final {
                    self.counterpart_draft = None;
                    self.store.apply_incoming(message);
                } else {
                    self.counterpart_draft = Some(message.text).filter(|text| !text.is_empty());
                }
            }
        }
    }

    fn is_current(&self, token: SessionToken, kind: &'static str) -> bool {
        if token == self.token {
            return true;
        }

        tracing::debug!(code = STALE_RESULT_DISCARDED, kind, "discarding result of a closed session");
        false
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}
