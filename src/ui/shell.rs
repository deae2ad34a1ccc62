use anyhow::Result;
use tokio::sync::mpsc;

use crate::{
    domain::events::AppEvent,
    usecases::{context::AppContext, contracts::ShellOrchestrator},
};

use super::{event_source::KeyReader, terminal::TerminalSession, view};

pub async fn start(
    context: &AppContext,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events: &mut mpsc::UnboundedReceiver<AppEvent>,
    orchestrator: &mut dyn ShellOrchestrator,
) -> Result<()> {
    tracing::info!(
        log_level = %context.config.logging.level,
        backend_url = %context.backend_url,
        "starting TUI shell"
    );

    let mut terminal = TerminalSession::new()?;
    let _keys = KeyReader::spawn(events_tx);

    drive(events, orchestrator, |orchestrator| {
        terminal.draw(|frame| view::render(frame, orchestrator.state(), orchestrator.session()))
    })
    .await
}

/// Draws, waits for the next event, then applies it together with everything
/// already queued behind it before drawing again.
async fn drive<D>(
    events: &mut mpsc::UnboundedReceiver<AppEvent>,
    orchestrator: &mut dyn ShellOrchestrator,
    mut draw: D,
) -> Result<()>
where
    D: FnMut(&dyn ShellOrchestrator) -> Result<()>,
{
    while orchestrator.state().is_running() {
        draw(&*orchestrator)?;

        let Some(event) = events.recv().await else {
            break;
        };
        orchestrator.handle_event(event)?;

        while orchestrator.state().is_running() {
            match events.try_recv() {
                Ok(event) => orchestrator.handle_event(event)?,
                Err(_) => break,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        backend::reconnect::ReconnectPolicy,
        domain::events::KeyInput,
        infra::stubs::MemoryClipboard,
        test_support::{RecordingGateway, ScriptedConnector},
        usecases::{
            chat_session::{ChatSession, SessionDeps},
            draft_sync::DEFAULT_DEBOUNCE,
            shell::DefaultShellOrchestrator,
        },
    };

    fn orchestrator(
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> DefaultShellOrchestrator<MemoryClipboard> {
        let session = ChatSession::open(
            None,
            SessionDeps {
                gateway: Arc::new(RecordingGateway::default()),
                connector: Arc::new(ScriptedConnector::new(vec![])),
                events,
                debounce: DEFAULT_DEBOUNCE,
                reconnect: ReconnectPolicy::default(),
            },
        );
        DefaultShellOrchestrator::new(session, MemoryClipboard::default())
    }

    #[tokio::test]
    async fn stops_on_quit_and_draws_once_per_batch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut orchestrator = orchestrator(tx.clone());
        for ch in ['h', 'i'] {
            tx.send(AppEvent::InputKey(KeyInput::new(ch.to_string(), false)))
                .expect("event queued");
        }
        tx.send(AppEvent::InputKey(KeyInput::new("enter", false)))
            .expect("event queued");
        tx.send(AppEvent::QuitRequested).expect("event queued");

        let mut draws = 0;
        drive(&mut rx, &mut orchestrator, |_| {
            draws += 1;
            Ok(())
        })
        .await
        .expect("loop should finish");

        assert_eq!(draws, 1);
        assert!(!orchestrator.state().is_running());
        let texts: Vec<_> = orchestrator
            .session()
            .messages()
            .iter()
            .map(|m| m.text.clone())
            .collect();
        assert_eq!(texts, vec!["hi".to_owned()]);
    }

    #[tokio::test]
    async fn ends_when_the_event_channel_closes() {
        let (session_tx, _session_rx) = mpsc::unbounded_channel();
        let mut orchestrator = orchestrator(session_tx);
        let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
        drop(tx);

        drive(&mut rx, &mut orchestrator, |_| Ok(()))
            .await
            .expect("loop should finish");

        assert!(orchestrator.state().is_running());
    }
}
