//! Which room to join, and how to point someone else at it.

use url::Url;

use crate::domain::session::ChatId;

const ROOM_QUERY_PARAM: &str = "room";

/// Resolves the session id once at startup.
///
/// An explicit room wins, then the `room` query parameter of a shared link,
/// then the configured fallback. A blank fallback leaves the session without a
/// chat id.
pub fn resolve_chat_id(room: Option<&str>, link: Option<&str>, fallback: &str) -> Option<ChatId> {
    room.and_then(ChatId::parse)
        .or_else(|| link.and_then(room_from_link))
        .or_else(|| ChatId::parse(fallback))
}

/// Relative link another client can open to join the same room.
pub fn share_link(chat_id: &ChatId) -> String {
    format!("?{ROOM_QUERY_PARAM}={chat_id}")
}

fn room_from_link(link: &str) -> Option<ChatId> {
    let query = match Url::parse(link) {
        Ok(url) => url.query().map(str::to_owned),
        Err(_) => link.split_once('?').map(|(_, query)| query.to_owned()),
    }?;

    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == ROOM_QUERY_PARAM)
        .and_then(|(_, value)| ChatId::parse(&value))
}
