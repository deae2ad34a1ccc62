//! Ordered, newest-first message sequence for one chat session.

use std::sync::mpsc;

use super::message::{
    DeliveryStatus, IdGenerator, IncomingMessage, Message, MessageId, Sender, LOCAL_TIME_LABEL,
};

/// Notification sent to subscribers after an effective mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Replaced { len: usize },
    Prepended { id: MessageId },
    Cleared,
}

/// Owns the message sequence.
///
/// Index 0 is always the newest entry. A history snapshot replaces everything,
/// a finalized incremental update prepends one entry, and nothing is ever
/// deduplicated by text.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    ids: IdGenerator,
    subscribers: Vec<mpsc::Sender<StoreChange>>,
}

impl MessageStore {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<StoreChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Replaces the whole sequence. `newest_first` must already be reversed
    /// from wire order.
    pub fn apply_history(&mut self, newest_first: Vec<IncomingMessage>) {
        self.messages = newest_first
            .into_iter()
            .map(|message| message.into_history_entry(&self.ids))
            .collect();

        let len = self.messages.len();
        self.notify(StoreChange::Replaced { len });
    }

    /// Prepends a server-confirmed message. Non-final updates are ignored.
    pub fn apply_incoming(&mut self, message: IncomingMessage) -> bool {
        if !message.is_final {
            return false;
        }

        let entry = message.into_incoming_entry(&self.ids);
        self.prepend(entry);
        true
    }

    /// Prepends a locally authored entry. Blank text is a no-op.
    pub fn push_local(
        &mut self,
        text: &str,
        is_sent: bool,
        status: DeliveryStatus,
    ) -> Option<MessageId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let entry = Message {
            id: self.ids.next_id(),
            text: text.to_owned(),
            sender: if is_sent { Sender::You } else { Sender::Patient },
            time: LOCAL_TIME_LABEL.to_owned(),
            is_sent,
            status,
        };
        let id = entry.id.clone();
        self.prepend(entry);
        Some(id)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.notify(StoreChange::Cleared);
    }

    fn prepend(&mut self, entry: Message) {
        let id = entry.id.clone();
        self.messages.insert(0, entry);
        self.notify(StoreChange::Prepended { id });
    }

    fn notify(&mut self, change: StoreChange) {
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}
