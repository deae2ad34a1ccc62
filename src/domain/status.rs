use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Observable state of the push-stream connection for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub connection: ConnectionStatus,
    pub last_error: Option<String>,
    pub updated_at_unix_ms: u128,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            connection: ConnectionStatus::Connecting,
            last_error: None,
            updated_at_unix_ms: now_unix_ms(),
        }
    }
}

impl SessionStatus {
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionStatus::Connected
    }
}

pub fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
