//! JSON payloads carried by the push stream.

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{events::StreamEvent, message::IncomingMessage};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("stream payload is not a recognized event: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireEvent {
    History { messages: Vec<WireMessage> },
    Message { message: WireMessage },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    #[serde(default)]
    id: Option<WireScalar>,
    text: String,
    #[serde(default)]
    timestamp: Option<WireScalar>,
    is_final: bool,
}

/// Servers send ids and timestamps either as strings or as numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireScalar {
    Text(String),
    Number(serde_json::Number),
}

impl WireScalar {
    fn into_string(self) -> String {
        match self {
            Self::Text(value) => value,
            Self::Number(value) => value.to_string(),
        }
    }
}

impl From<WireMessage> for IncomingMessage {
    fn from(message: WireMessage) -> Self {
        Self {
            id: message.id.map(WireScalar::into_string),
            text: message.text,
            timestamp: message.timestamp.map(WireScalar::into_string),
            is_final: message.is_final,
        }
    }
}

/// Decodes one event payload. History entries keep wire (oldest-first) order.
pub fn decode_event(payload: &str) -> Result<StreamEvent, DecodeError> {
    let event = match serde_json::from_str::<WireEvent>(payload)? {
        WireEvent::History { messages } => {
            StreamEvent::History(messages.into_iter().map(IncomingMessage::from).collect())
        }
        WireEvent::Message { message } => StreamEvent::Message(message.into()),
    };

    Ok(event)
}
