use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::usecases::bootstrap::LaunchOptions;

#[derive(Debug, Parser)]
#[command(
    name = "roomchat",
    about = "Terminal chat client with live draft streaming"
)]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Room to join (overrides --url and the configured default)
    #[arg(short, long, global = true)]
    pub room: Option<String>,

    /// Shared link to take the room from, e.g. "https://host/?room=42"
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Backend base URL (overrides [backend].url)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start TUI shell
    Run,
    /// Print the share link of the resolved room
    Share,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            config_path: self.config.clone(),
            room: self.room.clone(),
            link: self.url.clone(),
            backend_url: self.backend_url.clone(),
        }
    }
}
