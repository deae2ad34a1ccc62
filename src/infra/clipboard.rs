use anyhow::{Context, Result};

use crate::infra::contracts::Clipboard;

/// System clipboard. The handle is opened lazily so headless sessions only
/// fail when a copy is actually requested.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().context("system clipboard is unavailable")?,
        };
        let clipboard = self.inner.insert(clipboard);

        clipboard
            .set_text(text.to_owned())
            .context("failed to write to the clipboard")
    }
}
