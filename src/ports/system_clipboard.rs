use anyhow::Result;

use crate::core::interfaces::adapters::TextClipboard;

pub struct SystemClipboard;

impl TextClipboard for SystemClipboard {
    fn copy_text(&self, text: &str) -> Result<()> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text))
            .map_err(|error| {
                log::error!("[CLIPBOARD] Failed to copy to clipboard: {}", error);
                anyhow::anyhow!("clipboard unavailable: {}", error)
            })?;

        log::info!("[CLIPBOARD] Copied {} characters", text.chars().count());
        Ok(())
    }
}
