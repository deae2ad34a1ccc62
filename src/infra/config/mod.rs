mod app_config;
mod file_config;
mod loader;

pub use app_config::{
    AppConfig, BackendConfig, DraftConfig, LogConfig, ReconnectConfig, SessionConfig,
};
pub use loader::load;
