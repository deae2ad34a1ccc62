use std::{path::PathBuf, sync::Arc, time::Duration};

use tokio::sync::mpsc;
use url::Url;

use crate::{
    backend::{connector::SseConnector, gateway::HttpGateway, reconnect::ReconnectPolicy},
    domain::events::AppEvent,
    infra::{
        self,
        config::ReconnectConfig,
        error::AppError,
        storage_layout::StorageLayout,
    },
    usecases::{
        chat_session::{ChatSession, SessionDeps},
        context::AppContext,
        room::resolve_chat_id,
    },
};

/// Startup inputs gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub config_path: Option<PathBuf>,
    pub room: Option<String>,
    pub link: Option<String>,
    pub backend_url: Option<String>,
}

/// Builds the context and routes logs to the state directory.
pub fn bootstrap(options: &LaunchOptions) -> Result<AppContext, AppError> {
    let mut context = build_context(options)?;

    let layout = StorageLayout::resolve()?;
    layout.ensure_dirs()?;
    let guard = infra::logging::init(&context.config.logging, &layout.log_dir)?;
    context.hold_log_guard(guard);

    tracing::info!(
        backend_url = %context.backend_url,
        chat_id = context.chat_id.as_ref().map(|id| id.as_str()).unwrap_or("<none>"),
        log_dir = %layout.log_dir.display(),
        "context bootstrapped"
    );

    Ok(context)
}

/// Loads config, applies command-line overrides and resolves the room.
pub fn build_context(options: &LaunchOptions) -> Result<AppContext, AppError> {
    let mut config = infra::config::load(options.config_path.as_deref())?;
    if let Some(url) = &options.backend_url {
        config.backend.url = url.clone();
    }

    let backend_url = Url::parse(&config.backend.url).map_err(|source| AppError::BackendUrl {
        url: config.backend.url.clone(),
        source,
    })?;

    let chat_id = resolve_chat_id(
        options.room.as_deref(),
        options.link.as_deref(),
        &config.session.default_room,
    );

    Ok(AppContext::new(config, chat_id, backend_url))
}

/// Wires the HTTP adapters and opens the chat session. Must run inside the
/// runtime because the session spawns its stream task.
pub fn compose_session(
    context: &AppContext,
    events: mpsc::UnboundedSender<AppEvent>,
) -> Result<ChatSession, AppError> {
    let http = reqwest::Client::builder()
        .build()
        .map_err(AppError::HttpClient)?;

    let deps = SessionDeps {
        gateway: Arc::new(HttpGateway::new(http.clone(), context.backend_url.clone())),
        connector: Arc::new(SseConnector::new(http, context.backend_url.clone())),
        events,
        debounce: Duration::from_millis(context.config.draft.debounce_ms),
        reconnect: reconnect_policy(&context.config.reconnect),
    };

    Ok(ChatSession::open(context.chat_id.clone(), deps))
}

fn reconnect_policy(config: &ReconnectConfig) -> ReconnectPolicy {
    let base = Duration::from_millis(config.base_ms.max(1));

    ReconnectPolicy {
        base,
        cap: Duration::from_millis(config.cap_ms).max(base),
        jitter_ratio: f64::from(config.jitter_percent.min(100)) / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use super::*;
    use crate::{domain::status::ConnectionStatus, infra::config::AppConfig};

    fn options_with_missing_config() -> LaunchOptions {
        LaunchOptions {
            config_path: Some(Path::new("./missing-config.toml").to_path_buf()),
            ..LaunchOptions::default()
        }
    }

    #[test]
    fn builds_context_with_default_config_when_file_is_missing() {
        let context = build_context(&options_with_missing_config())
            .expect("context should build from defaults");

        assert_eq!(context.config, AppConfig::default());
        assert_eq!(context.backend_url.as_str(), "http://localhost:3000/");
        assert_eq!(context.chat_id.as_ref().map(|id| id.as_str()), Some("1"));
    }

    #[test]
    fn command_line_overrides_backend_and_room() {
        let options = LaunchOptions {
            room: Some("42".to_owned()),
            backend_url: Some("https://chat.example.org/api".to_owned()),
            ..options_with_missing_config()
        };

        let context = build_context(&options).expect("context should build");

        assert_eq!(context.backend_url.as_str(), "https://chat.example.org/api");
        assert_eq!(context.chat_id.as_ref().map(|id| id.as_str()), Some("42"));
    }

    #[test]
    fn room_comes_from_shared_link_when_not_given() {
        let options = LaunchOptions {
            link: Some("https://chat.example.org/?room=7".to_owned()),
            ..options_with_missing_config()
        };

        let context = build_context(&options).expect("context should build");

        assert_eq!(context.chat_id.as_ref().map(|id| id.as_str()), Some("7"));
    }

    #[test]
    fn blank_default_room_leaves_context_without_chat() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[session]\ndefault_room = \"\"\n").expect("config written");

        let options = LaunchOptions {
            config_path: Some(config_path),
            ..LaunchOptions::default()
        };
        let context = build_context(&options).expect("context should build");

        assert!(context.chat_id.is_none());
    }

    #[test]
    fn rejects_invalid_backend_url() {
        let options = LaunchOptions {
            backend_url: Some("not a url".to_owned()),
            ..options_with_missing_config()
        };

        let error = build_context(&options).err().expect("url must be rejected");

        assert!(matches!(error, AppError::BackendUrl { ref url, .. } if url == "not a url"));
    }

    #[test]
    fn reconnect_policy_follows_config() {
        let policy = reconnect_policy(&ReconnectConfig {
            base_ms: 500,
            cap_ms: 4_000,
            jitter_percent: 10,
        });

        assert_eq!(policy.base, Duration::from_millis(500));
        assert_eq!(policy.cap, Duration::from_secs(4));
        assert!((policy.jitter_ratio - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn reconnect_policy_never_goes_below_one_millisecond() {
        let policy = reconnect_policy(&ReconnectConfig {
            base_ms: 0,
            cap_ms: 0,
            jitter_percent: 0,
        });

        assert_eq!(policy.base, Duration::from_millis(1));
        assert_eq!(policy.cap, Duration::from_millis(1));
    }

    #[tokio::test]
    async fn session_without_chat_starts_disconnected() {
        let options = LaunchOptions {
            room: None,
            ..options_with_missing_config()
        };
        let mut context = build_context(&options).expect("context should build");
        context.chat_id = None;
        let (tx, _rx) = mpsc::unbounded_channel();

        let session = compose_session(&context, tx).expect("session should compose");

        assert!(session.chat_id().is_none());
        assert_eq!(session.status().connection, ConnectionStatus::Disconnected);
    }
}
