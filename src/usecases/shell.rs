use std::sync::mpsc;

use anyhow::Result;

use crate::{
    domain::{
        draft_state::DraftState,
        events::{AppEvent, KeyInput},
        message_store::StoreChange,
        shell_state::ShellState,
    },
    infra::contracts::Clipboard,
    usecases::{chat_session::ChatSession, room::share_link},
};

use super::contracts::ShellOrchestrator;

const SHARE_LINK_COPY_FAILED: &str = "SHARE_LINK_COPY_FAILED";

pub struct DefaultShellOrchestrator<C>
where
    C: Clipboard,
{
    state: ShellState,
    session: ChatSession,
    store_changes: mpsc::Receiver<StoreChange>,
    clipboard: C,
}

impl<C> DefaultShellOrchestrator<C>
where
    C: Clipboard,
{
    pub fn new(mut session: ChatSession, clipboard: C) -> Self {
        let store_changes = session.subscribe_messages();

        Self {
            state: ShellState::default(),
            session,
            store_changes,
            clipboard,
        }
    }

    fn handle_key(&mut self, key: KeyInput) {
        if key.ctrl {
            match key.key.as_str() {
                "l" => self.session.clear_all(),
                "y" => self.copy_share_link(),
                "c" => self.quit(),
                _ => {}
            }
            return;
        }

        match key.key.as_str() {
            "esc" => self.quit(),
            "enter" if key.shift || key.alt => {}
            "enter" => {
                self.session.commit_draft();
            }
            "backspace" => self.session.edit_draft(DraftState::delete_before),
            "delete" => self.session.edit_draft(DraftState::delete_at),
            "left" => self.session.edit_draft(|draft| {
                draft.move_left();
                false
            }),
            "right" => self.session.edit_draft(|draft| {
                draft.move_right();
                false
            }),
            "home" => self.session.edit_draft(|draft| {
                draft.move_home();
                false
            }),
            "end" => self.session.edit_draft(|draft| {
                draft.move_end();
                false
            }),
            other => {
                let mut chars = other.chars();
                if let (Some(ch), None) = (chars.next(), chars.next()) {
                    self.state.clear_notice();
                    self.session.edit_draft(|draft| draft.insert_char(ch));
                }
            }
        }
    }

    fn copy_share_link(&mut self) {
        let Some(chat_id) = self.session.chat_id() else {
            self.state.set_notice("No room to share");
            return;
        };

        let link = share_link(chat_id);
        match self.clipboard.copy_text(&link) {
            Ok(()) => self.state.set_notice(format!("Copied {link}")),
            Err(error) => {
                tracing::warn!(code = SHARE_LINK_COPY_FAILED, error = %error, "share link not copied");
                self.state.set_notice(format!("Share link: {link}"));
            }
        }
    }

    /// Turns list-level changes into one-line feedback.
    fn absorb_store_changes(&mut self) {
        while let Ok(change) = self.store_changes.try_recv() {
            match change {
                StoreChange::Replaced { len } => {
                    self.state.set_notice(format!("History loaded: {len} messages"));
                }
                StoreChange::Cleared => self.state.set_notice("Chat cleared"),
                StoreChange::Prepended { .. } => {}
            }
        }
    }

    fn quit(&mut self) {
        self.session.close();
        self.state.stop();
    }
}

impl<C> ShellOrchestrator for DefaultShellOrchestrator<C>
where
    C: Clipboard,
{
    fn state(&self) -> &ShellState {
        &self.state
    }

    fn session(&self) -> &ChatSession {
        &self.session
    }

    fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::QuitRequested => self.quit(),
            AppEvent::Redraw => {}
            AppEvent::InputKey(key) => self.handle_key(key),
            AppEvent::Stream(notice) => self.session.handle_stream(notice),
            AppEvent::Submission(report) => self.session.handle_submission(report),
        }

        self.absorb_store_changes();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        backend::reconnect::ReconnectPolicy,
        domain::{
            events::{StreamEvent, StreamNotice},
            message::{DeliveryStatus, IncomingMessage},
            session::ChatId,
        },
        infra::stubs::MemoryClipboard,
        test_support::{RecordingGateway, ScriptedConnector},
        usecases::{chat_session::SessionDeps, draft_sync::DEFAULT_DEBOUNCE},
    };

    struct Harness {
        orchestrator: DefaultShellOrchestrator<MemoryClipboard>,
        gateway: RecordingGateway,
        rx: mpsc::UnboundedReceiver<AppEvent>,
    }

    impl Harness {
        fn open(chat_id: Option<&str>, clipboard: MemoryClipboard) -> Self {
            Self::open_with(chat_id, RecordingGateway::default(), clipboard)
        }

        fn open_with(
            chat_id: Option<&str>,
            gateway: RecordingGateway,
            clipboard: MemoryClipboard,
        ) -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let session = ChatSession::open(
                chat_id.and_then(ChatId::parse),
                SessionDeps {
                    gateway: Arc::new(gateway.clone()),
                    connector: Arc::new(ScriptedConnector::new(vec![])),
                    events: tx,
                    debounce: DEFAULT_DEBOUNCE,
                    reconnect: ReconnectPolicy::default(),
                },
            );

            Self {
                orchestrator: DefaultShellOrchestrator::new(session, clipboard),
                gateway,
                rx,
            }
        }

        fn press(&mut self, key: KeyInput) {
            self.orchestrator
                .handle_event(AppEvent::InputKey(key))
                .expect("key must be handled");
        }

        fn type_text(&mut self, text: &str) {
            for ch in text.chars() {
                self.press(KeyInput::new(ch.to_string(), false));
            }
        }

        async fn settle(&mut self) {
            tokio::time::sleep(Duration::from_secs(1)).await;
            while let Ok(event) = self.rx.try_recv() {
                self.orchestrator
                    .handle_event(event)
                    .expect("event must be handled");
            }
        }

        fn texts(&self) -> Vec<String> {
            self.orchestrator
                .session()
                .messages()
                .iter()
                .map(|m| m.text.clone())
                .collect()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_quit_event() {
        let mut harness = Harness::open(Some("1"), MemoryClipboard::default());

        harness
            .orchestrator
            .handle_event(AppEvent::QuitRequested)
            .expect("event must be handled");

        assert!(!harness.orchestrator.state().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn esc_quits() {
        let mut harness = Harness::open(Some("1"), MemoryClipboard::default());

        harness.press(KeyInput::new("esc", false));

        assert!(!harness.orchestrator.state().is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn typing_then_enter_commits_and_submits_final() {
        let mut harness = Harness::open(Some("1"), MemoryClipboard::default());

        harness.type_text("hello");
        harness.press(KeyInput::new("enter", false));
        harness.settle().await;

        assert_eq!(harness.texts(), vec!["hello".to_owned()]);
        assert_eq!(harness.orchestrator.session().draft().text(), "");
        let calls = harness.gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].text, "hello");
        assert!(calls[0].is_final);
    }

    #[tokio::test(start_paused = true)]
    async fn shift_enter_does_not_commit() {
        let mut harness = Harness::open(Some("1"), MemoryClipboard::default());

        harness.type_text("hi");
        harness.press(KeyInput::new("enter", false).with_shift());

        assert!(harness.texts().is_empty());
        assert_eq!(harness.orchestrator.session().draft().text(), "hi");
    }

    #[tokio::test(start_paused = true)]
    async fn alt_enter_does_not_commit() {
        let mut harness = Harness::open(Some("1"), MemoryClipboard::default());

        harness.type_text("hi");
        harness.press(KeyInput::new("enter", false).with_alt());

        assert!(harness.texts().is_empty());
        assert_eq!(harness.orchestrator.session().draft().text(), "hi");
    }

    #[tokio::test(start_paused = true)]
    async fn cursor_keys_edit_in_place() {
        let mut harness = Harness::open(None, MemoryClipboard::default());

        harness.type_text("ac");
        harness.press(KeyInput::new("left", false));
        harness.type_text("b");
        harness.press(KeyInput::new("end", false));
        harness.press(KeyInput::new("backspace", false));
        harness.press(KeyInput::new("home", false));
        harness.press(KeyInput::new("delete", false));

        assert_eq!(harness.orchestrator.session().draft().text(), "b");
    }

    #[tokio::test(start_paused = true)]
    async fn typing_streams_one_debounced_draft_update() {
        let mut harness = Harness::open(Some("1"), MemoryClipboard::default());

        harness.type_text("abc");
        harness.settle().await;

        let calls = harness.gateway.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].text, "abc");
        assert!(!calls[0].is_final);
    }

    #[tokio::test(start_paused = true)]
    async fn ctrl_l_clears_messages_and_draft() {
        let mut harness = Harness::open(None, MemoryClipboard::default());
        harness.type_text("one");
        harness.press(KeyInput::new("enter", false));
        harness.type_text("two");

        harness.press(KeyInput::new("l", true));

        assert!(harness.texts().is_empty());
        assert_eq!(harness.orchestrator.session().draft().text(), "");
        assert_eq!(harness.orchestrator.state().notice(), Some("Chat cleared"));
    }

    #[tokio::test(start_paused = true)]
    async fn ctrl_y_copies_share_link() {
        let mut harness = Harness::open(Some("room-9"), MemoryClipboard::default());

        harness.press(KeyInput::new("y", true));

        assert_eq!(
            harness.orchestrator.clipboard.last_copied.as_deref(),
            Some("?room=room-9")
        );
        assert_eq!(
            harness.orchestrator.state().notice(),
            Some("Copied ?room=room-9")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ctrl_y_without_room_only_sets_notice() {
        let mut harness = Harness::open(None, MemoryClipboard::default());

        harness.press(KeyInput::new("y", true));

        assert_eq!(harness.orchestrator.clipboard.last_copied, None);
        assert_eq!(harness.orchestrator.state().notice(), Some("No room to share"));
    }

    #[tokio::test(start_paused = true)]
    async fn clipboard_failure_shows_link_instead() {
        let clipboard = MemoryClipboard {
            unavailable: true,
            ..MemoryClipboard::default()
        };
        let mut harness = Harness::open(Some("5"), clipboard);

        harness.press(KeyInput::new("y", true));

        assert!(harness.orchestrator.state().is_running());
        assert_eq!(harness.orchestrator.state().notice(), Some("Share link: ?room=5"));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_commit_surfaces_failed_entry() {
        let mut harness = Harness::open_with(
            Some("1"),
            RecordingGateway::failing(),
            MemoryClipboard::default(),
        );

        harness.type_text("help");
        harness.press(KeyInput::new("enter", false));
        harness.settle().await;

        let statuses: Vec<_> = harness
            .orchestrator
            .session()
            .messages()
            .iter()
            .map(|m| m.status)
            .collect();
        assert_eq!(statuses, vec![DeliveryStatus::Failed, DeliveryStatus::Sent]);
    }

    #[tokio::test(start_paused = true)]
    async fn history_snapshot_is_announced() {
        let mut harness = Harness::open(Some("1"), MemoryClipboard::default());
        let token = harness.orchestrator.session().token();

        harness
            .orchestrator
            .handle_event(AppEvent::Stream(StreamNotice::Event {
                token,
                event: StreamEvent::History(vec![IncomingMessage {
                    id: Some("1".to_owned()),
                    text: "earlier".to_owned(),
                    timestamp: None,
                    is_final: true,
                }]),
            }))
            .expect("event must be handled");

        assert_eq!(harness.texts(), vec!["earlier".to_owned()]);
        assert_eq!(
            harness.orchestrator.state().notice(),
            Some("History loaded: 1 messages")
        );
    }
}
