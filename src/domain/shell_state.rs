#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    running: bool,
    notice: Option<String>,
}

impl Default for ShellState {
    fn default() -> Self {
        Self {
            running: true,
            notice: None,
        }
    }
}

impl ShellState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// One-line feedback for the last user action, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
