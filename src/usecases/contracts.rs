use anyhow::Result;

use crate::{
    domain::{events::AppEvent, shell_state::ShellState},
    usecases::chat_session::ChatSession,
};

pub trait ShellOrchestrator {
    fn state(&self) -> &ShellState;
    fn session(&self) -> &ChatSession;
    fn handle_event(&mut self, event: AppEvent) -> Result<()>;
}
