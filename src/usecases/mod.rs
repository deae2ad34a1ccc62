//! Use case layer: application workflows and orchestration.

pub mod bootstrap;
pub mod chat_session;
pub mod context;
pub mod contracts;
pub mod draft_sync;
pub mod room;
pub mod shell;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
