use std::{
    fmt,
    sync::atomic::{AtomicI64, Ordering},
};

/// Label shown for locally created entries until the server echoes them back.
pub const LOCAL_TIME_LABEL: &str = "Just now";

/// Who authored a message, from the local user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    You,
    Patient,
    System,
}

impl Sender {
    pub fn display_label(self) -> &'static str {
        match self {
            Self::You => "You",
            Self::Patient => "Patient",
            Self::System => "System",
        }
    }
}

/// Delivery state of a message entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryStatus {
    Pending,
    #[default]
    Sent,
    Failed,
}

/// Opaque message identifier, unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    /// Display timestamp, passed through as received.
    pub time: String,
    /// True when the entry originated from this client.
    pub is_sent: bool,
    pub status: DeliveryStatus,
}

/// A message as delivered by the push stream, before it is mapped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub id: Option<String>,
    pub text: String,
    pub timestamp: Option<String>,
    pub is_final: bool,
}

impl IncomingMessage {
    /// Maps an entry of a history snapshot.
    pub fn into_history_entry(self, ids: &IdGenerator) -> Message {
        let sender = if self.is_final {
            Sender::System
        } else {
            Sender::Patient
        };
        self.into_message(sender, ids)
    }

    /// Maps a finalized incremental update.
    pub fn into_incoming_entry(self, ids: &IdGenerator) -> Message {
        self.into_message(Sender::Patient, ids)
    }

    fn into_message(self, sender: Sender, ids: &IdGenerator) -> Message {
        let id = match self.id {
            Some(id) if !id.is_empty() => MessageId::new(id),
            _ => ids.next_id(),
        };

        Message {
            id,
            text: self.text,
            sender,
            time: self.timestamp.unwrap_or_default(),
            is_sent: false,
            status: DeliveryStatus::Sent,
        }
    }
}

/// Synthesizes ids for messages that arrive without one.
///
/// Values are seeded from the wall clock in milliseconds and strictly increase,
/// even when the clock stalls or steps backwards.
#[derive(Debug)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }
}

impl IdGenerator {
    pub fn next_id(&self) -> MessageId {
        let now = chrono::Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return MessageId::new(format!("local-{candidate}")),
                Err(observed) => current = observed,
            }
        }
    }
}
