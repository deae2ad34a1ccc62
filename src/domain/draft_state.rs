//! Draft text being composed, and the bookkeeping that decides whether an
//! edit is worth transmitting as a live update.

/// Upper bound on draft length, in characters.
const MAX_DRAFT_LENGTH: usize = 4096;

/// What the synchronizer should do after the draft text changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftDecision {
    /// Nothing to schedule: blank draft, or already transmitted.
    Idle,
    /// Schedule a non-final transmission of this text.
    Schedule(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DraftState {
    text: String,
    /// Cursor position as a character index.
    cursor: usize,
    /// Last text acknowledged by a successful non-final transmission.
    last_transmitted: String,
}

impl DraftState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn last_transmitted(&self) -> &str {
        &self.last_transmitted
    }

    /// Returns false when the draft is already at its maximum length.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if self.text.chars().count() >= MAX_DRAFT_LENGTH {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
        true
    }

    pub fn delete_before(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.remove_at_cursor();
        true
    }

    pub fn delete_at(&mut self) -> bool {
        if self.cursor >= self.text.chars().count() {
            return false;
        }
        self.remove_at_cursor();
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Replaces the whole draft and puts the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().take(MAX_DRAFT_LENGTH).collect();
        self.move_end();
    }

    /// Decides what the current text calls for.
    pub fn decide(&self) -> DraftDecision {
        if self.text.trim().is_empty() || self.text == self.last_transmitted {
            return DraftDecision::Idle;
        }

        DraftDecision::Schedule(self.text.clone())
    }

    pub fn record_transmitted(&mut self, text: &str) {
        self.last_transmitted = text.to_owned();
    }

    /// Takes the draft for a final submission, leaving it empty and resetting
    /// the transmitted marker so the same text can be sent again later.
    pub fn take_for_commit(&mut self) -> String {
        self.cursor = 0;
        self.last_transmitted.clear();
        std::mem::take(&mut self.text)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn remove_at_cursor(&mut self) {
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.drain(start..end);
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(byte_index, _)| byte_index)
            .unwrap_or(self.text.len())
    }
}
