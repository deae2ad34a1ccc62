//! Wire formats: server-sent event framing and JSON payloads.

pub mod sse;
pub mod stream_event;
pub mod submission;

/// Returns the protocol module name for smoke checks.
pub fn module_name() -> &'static str {
    "protocol"
}
