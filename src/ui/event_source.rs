use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::domain::events::{AppEvent, KeyInput};

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);
const TERMINAL_READ_FAILED: &str = "TERMINAL_READ_FAILED";

/// Reads terminal input on its own thread and forwards it into the app
/// event channel. Stops and joins on drop.
pub struct KeyReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyReader {
    pub fn spawn(events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || read_loop(&thread_stop, &events));

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for KeyReader {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn read_loop(stop: &AtomicBool, events: &mpsc::UnboundedSender<AppEvent>) {
    while !stop.load(Ordering::Relaxed) {
        let next = match event::poll(EVENT_POLL_TIMEOUT) {
            Ok(false) => continue,
            Ok(true) => event::read(),
            Err(error) => Err(error),
        };

        let mapped = match next {
            Ok(Event::Key(key)) => map_key(key),
            Ok(Event::Resize(_, _)) => Some(AppEvent::Redraw),
            Ok(_) => None,
            Err(error) => {
                tracing::error!(code = TERMINAL_READ_FAILED, error = %error, "terminal input failed");
                let _ = events.send(AppEvent::QuitRequested);
                return;
            }
        };

        if let Some(app_event) = mapped {
            if events.send(app_event).is_err() {
                return;
            }
        }
    }
}

pub fn map_key(key: KeyEvent) -> Option<AppEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(AppEvent::QuitRequested);
    }

    let name = match key.code {
        KeyCode::Esc => return Some(AppEvent::QuitRequested),
        KeyCode::Char(ch) => ch.to_string(),
        KeyCode::Enter => "enter".to_owned(),
        KeyCode::Backspace => "backspace".to_owned(),
        KeyCode::Delete => "delete".to_owned(),
        KeyCode::Left => "left".to_owned(),
        KeyCode::Right => "right".to_owned(),
        KeyCode::Home => "home".to_owned(),
        KeyCode::End => "end".to_owned(),
        _ => return None,
    };

    let mut input = KeyInput::new(name, ctrl);
    if key.modifiers.contains(KeyModifiers::SHIFT) {
        input = input.with_shift();
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        input = input.with_alt();
    }
    Some(AppEvent::InputKey(input))
}
