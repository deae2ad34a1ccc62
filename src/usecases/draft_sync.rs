//! Debounced propagation of the draft being typed.
//!
//! Every text change cancels the pending timer and, if the new text is worth
//! sending, schedules a fresh one. When the timer fires, a non-final update is
//! submitted in a detached task so later edits can no longer cancel it. A
//! commit appends the draft locally first, then submits it as final.

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    backend::gateway::BackendGateway,
    domain::{
        draft_state::{DraftDecision, DraftState},
        events::{AppEvent, SubmissionReport, SubmitOutcome},
        message::DeliveryStatus,
        message_store::MessageStore,
        session::{ChatId, SessionToken},
    },
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

const DRAFT_SUBMIT_FAILED: &str = "DRAFT_SUBMIT_FAILED";
const FINAL_SUBMIT_FAILED: &str = "FINAL_SUBMIT_FAILED";

/// Where submissions go: the chat and the session generation they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRoute {
    pub chat_id: ChatId,
    pub token: SessionToken,
}

/// Handle to the pending debounce timer.
#[derive(Debug, Default)]
pub struct ScheduledTask {
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    pub fn is_pending(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// No-op when nothing is scheduled or the timer already fired.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    fn replace(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.handle = Some(handle);
    }
}

/// What a commit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Blank draft, nothing happened.
    Skipped,
    /// Appended locally; no session, so nothing was sent.
    LocalOnly,
    /// Appended locally and a final submission is in flight.
    Submitted,
}

pub struct DraftSynchronizer {
    state: DraftState,
    debounce: Duration,
    pending: ScheduledTask,
    route: Option<SubmitRoute>,
    gateway: Arc<dyn BackendGateway>,
    reports: mpsc::UnboundedSender<AppEvent>,
}

impl std::fmt::Debug for DraftSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSynchronizer")
            .field("state", &self.state)
            .field("debounce", &self.debounce)
            .field("pending", &self.pending.is_pending())
            .field("route", &self.route)
            .finish()
    }
}

impl DraftSynchronizer {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        reports: mpsc::UnboundedSender<AppEvent>,
        debounce: Duration,
    ) -> Self {
        Self {
            state: DraftState::default(),
            debounce,
            pending: ScheduledTask::default(),
            route: None,
            gateway,
            reports,
        }
    }

    pub fn draft(&self) -> &DraftState {
        &self.state
    }

    pub fn has_pending_update(&self) -> bool {
        self.pending.is_pending()
    }

    /// Binds submissions to a session. Without a route, nothing is sent.
    pub fn bind(&mut self, route: Option<SubmitRoute>) {
        self.pending.cancel();
        self.route = route;
    }

    /// Applies a cursor or text edit. Text changes reschedule the timer.
    pub fn edit<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut DraftState) -> bool,
    {
        if edit(&mut self.state) {
            self.on_text_changed();
        }
    }

    #[cfg(test)]
    pub fn set_text(&mut self, text: &str) {
        self.edit(|state| {
            state.set_text(text);
            true
        });
    }

    /// Records a successful non-final transmission.
    pub fn record_transmitted(&mut self, text: &str) {
        self.state.record_transmitted(text);
    }

    pub fn commit(&mut self, store: &mut MessageStore) -> CommitOutcome {
        self.pending.cancel();
        let text = self.state.take_for_commit();

        if store.push_local(&text, true, DeliveryStatus::Sent).is_none() {
            return CommitOutcome::Skipped;
        }

        let Some(route) = self.route.clone() else {
            tracing::debug!("no active session; commit kept local");
            return CommitOutcome::LocalOnly;
        };

        tokio::spawn(submit_and_report(
            Arc::clone(&self.gateway),
            route,
            text.trim().to_owned(),
            true,
            self.reports.clone(),
        ));
        CommitOutcome::Submitted
    }

    /// Clears the draft and drops any pending update.
    pub fn discard(&mut self) {
        self.pending.cancel();
        self.state.clear();
    }

    pub fn cancel_pending(&mut self) {
        self.pending.cancel();
    }

    fn on_text_changed(&mut self) {
        self.pending.cancel();

        let DraftDecision::Schedule(text) = self.state.decide() else {
            return;
        };
        let Some(route) = self.route.clone() else {
            return;
        };

        let gateway = Arc::clone(&self.gateway);
        let reports = self.reports.clone();
        let delay = self.debounce;
        self.pending.replace(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(submit_and_report(gateway, route, text, false, reports));
        }));
    }
}

async fn submit_and_report(
    gateway: Arc<dyn BackendGateway>,
    route: SubmitRoute,
    text: String,
    is_final: bool,
    reports: mpsc::UnboundedSender<AppEvent>,
) {
    let outcome = match gateway.submit(&route.chat_id, &text, is_final).await {
        Ok(()) => SubmitOutcome::Delivered,
        Err(error) => {
            let code = if is_final {
                FINAL_SUBMIT_FAILED
            } else {
                DRAFT_SUBMIT_FAILED
            };
            tracing::warn!(code, chat_id = %route.chat_id, error = %error, "submission failed");
            SubmitOutcome::Failed {
                reason: error.to_string(),
            }
        }
    };

    let _ = reports.send(AppEvent::Submission(SubmissionReport {
        token: route.token,
        text,
        is_final,
        outcome,
    }));
}
