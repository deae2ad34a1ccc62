use tracing_appender::non_blocking::WorkerGuard;
use url::Url;

use crate::{domain::session::ChatId, infra::config::AppConfig};

pub struct AppContext {
    pub config: AppConfig,
    pub chat_id: Option<ChatId>,
    pub backend_url: Url,
    log_guard: Option<WorkerGuard>,
}

impl AppContext {
    pub fn new(config: AppConfig, chat_id: Option<ChatId>, backend_url: Url) -> Self {
        Self {
            config,
            chat_id,
            backend_url,
            log_guard: None,
        }
    }

    /// Keeps the log writer flushing until the context is dropped.
    pub fn hold_log_guard(&mut self, guard: WorkerGuard) {
        self.log_guard = Some(guard);
    }
}
