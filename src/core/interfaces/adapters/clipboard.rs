use anyhow::Result;

pub trait TextClipboard: Send + Sync {
    fn copy_text(&self, text: &str) -> Result<()>;
}
