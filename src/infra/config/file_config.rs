use serde::Deserialize;

use crate::infra::config::{
    AppConfig, BackendConfig, DraftConfig, LogConfig, ReconnectConfig, SessionConfig,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub backend: Option<FileBackendConfig>,
    pub session: Option<FileSessionConfig>,
    pub draft: Option<FileDraftConfig>,
    pub reconnect: Option<FileReconnectConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(backend) = self.backend {
            backend.merge_into(&mut config.backend);
        }

        if let Some(session) = self.session {
            session.merge_into(&mut config.session);
        }

        if let Some(draft) = self.draft {
            draft.merge_into(&mut config.draft);
        }

        if let Some(reconnect) = self.reconnect {
            reconnect.merge_into(&mut config.reconnect);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileBackendConfig {
    pub url: Option<String>,
}

impl FileBackendConfig {
    fn merge_into(self, config: &mut BackendConfig) {
        if let Some(url) = self.url {
            config.url = url;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSessionConfig {
    pub default_room: Option<String>,
}

impl FileSessionConfig {
    fn merge_into(self, config: &mut SessionConfig) {
        if let Some(default_room) = self.default_room {
            config.default_room = default_room;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDraftConfig {
    pub debounce_ms: Option<u64>,
}

impl FileDraftConfig {
    fn merge_into(self, config: &mut DraftConfig) {
        if let Some(debounce_ms) = self.debounce_ms {
            config.debounce_ms = debounce_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileReconnectConfig {
    pub base_ms: Option<u64>,
    pub cap_ms: Option<u64>,
    pub jitter_percent: Option<u8>,
}

impl FileReconnectConfig {
    fn merge_into(self, config: &mut ReconnectConfig) {
        if let Some(base_ms) = self.base_ms {
            config.base_ms = base_ms;
        }

        if let Some(cap_ms) = self.cap_ms {
            config.cap_ms = cap_ms;
        }

        if let Some(jitter_percent) = self.jitter_percent {
            config.jitter_percent = jitter_percent.min(100);
        }
    }
}
