use super::{
    message::IncomingMessage,
    session::SessionToken,
    status::SessionStatus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    QuitRequested,
    /// Terminal geometry changed; only a repaint is needed.
    Redraw,
    InputKey(KeyInput),
    Stream(StreamNotice),
    Submission(SubmissionReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>, ctrl: bool) -> Self {
        Self {
            key: key.into(),
            ctrl,
            shift: false,
            alt: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

/// A decoded push-stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Full snapshot, oldest first as received.
    History(Vec<IncomingMessage>),
    /// One update, final or a live draft.
    Message(IncomingMessage),
}

/// What the stream client reports back to the session owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamNotice {
    Event {
        token: SessionToken,
        event: StreamEvent,
    },
    Status {
        token: SessionToken,
        status: SessionStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Delivered,
    Failed { reason: String },
}

/// Result of one submission, reported after the network call completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub token: SessionToken,
    pub text: String,
    pub is_final: bool,
    pub outcome: SubmitOutcome,
}
