use anyhow::{bail, Result};

use crate::infra::contracts::Clipboard;

/// Clipboard that keeps the last copied text in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    pub last_copied: Option<String>,
    pub unavailable: bool,
}

impl Clipboard for MemoryClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        if self.unavailable {
            bail!("clipboard unavailable");
        }

        self.last_copied = Some(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_copied_text() {
        let mut clipboard = MemoryClipboard::default();

        clipboard.copy_text("first").expect("copy should succeed");
        clipboard.copy_text("second").expect("copy should succeed");

        assert_eq!(clipboard.last_copied.as_deref(), Some("second"));
    }

    #[test]
    fn unavailable_clipboard_reports_error() {
        let mut clipboard = MemoryClipboard {
            unavailable: true,
            ..MemoryClipboard::default()
        };

        assert!(clipboard.copy_text("x").is_err());
        assert_eq!(clipboard.last_copied, None);
    }
}
