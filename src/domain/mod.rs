//! Domain layer: core entities and state machines.

pub mod draft_state;
pub mod events;
pub mod message;
pub mod message_store;
pub mod session;
pub mod shell_state;
pub mod status;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
