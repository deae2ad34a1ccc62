//! Backend integration layer: submission endpoint and push-stream consumption.

pub mod connector;
pub mod gateway;
pub mod reconnect;
pub mod status_tracker;
pub mod stream_client;

use url::Url;

use crate::domain::session::ChatId;

/// Builds `{base}/chat/{chat_id}/{tail}` without disturbing any base path.
pub(crate) fn chat_endpoint(base: &Url, chat_id: &ChatId, tail: &str) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(["chat", chat_id.as_str(), tail]);
    Some(url)
}

/// Returns the backend module name for smoke checks.
pub fn module_name() -> &'static str {
    "backend"
}
