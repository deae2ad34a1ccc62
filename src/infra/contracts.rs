use anyhow::Result;

pub trait Clipboard {
    fn copy_text(&mut self, text: &str) -> Result<()>;
}
