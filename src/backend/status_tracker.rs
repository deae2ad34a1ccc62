use std::sync::{Arc, Mutex};

use crate::domain::status::{now_unix_ms, ConnectionStatus, SessionStatus};

/// Connection status shared between a stream task and its handle.
#[derive(Clone, Debug, Default)]
pub struct StatusTracker {
    inner: Arc<Mutex<SessionStatus>>,
}

impl StatusTracker {
    pub fn snapshot(&self) -> SessionStatus {
        self.inner
            .lock()
            .map(|status| status.clone())
            .unwrap_or_default()
    }

    pub fn on_connecting(&self) -> SessionStatus {
        self.mutate(|status| status.connection = ConnectionStatus::Connecting)
    }

    pub fn on_connected(&self) -> SessionStatus {
        self.mutate(|status| {
            status.connection = ConnectionStatus::Connected;
            status.last_error = None;
        })
    }

    pub fn on_disconnected(&self, error: &str) -> SessionStatus {
        self.mutate(|status| {
            status.connection = ConnectionStatus::Disconnected;
            status.last_error = Some(error.to_owned());
        })
    }

    pub fn on_closed(&self) -> SessionStatus {
        self.mutate(|status| status.connection = ConnectionStatus::Disconnected)
    }

    fn mutate<F>(&self, mutator: F) -> SessionStatus
    where
        F: FnOnce(&mut SessionStatus),
    {
        match self.inner.lock() {
            Ok(mut status) => {
                mutator(&mut status);
                status.updated_at_unix_ms = now_unix_ms();
                status.clone()
            }
            Err(_) => SessionStatus::default(),
        }
    }
}
