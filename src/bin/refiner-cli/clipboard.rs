use arboard::Clipboard;
use async_trait::async_trait;

use prompt_refiner::bridge::ClipboardSource;
use prompt_refiner::RefinerError;

/// The desktop clipboard. A fresh handle is opened per call, so the process
/// holds no clipboard ownership between commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[async_trait]
impl ClipboardSource for SystemClipboard {
    async fn read_text(&self) -> Result<String, RefinerError> {
        let mut clipboard = Clipboard::new().map_err(unavailable)?;
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Non-text content reads as empty.
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(err) => Err(unavailable(err)),
        }
    }

    async fn write_text(&self, text: &str) -> Result<(), RefinerError> {
        let mut clipboard = Clipboard::new().map_err(unavailable)?;
        clipboard.set_text(text.to_string()).map_err(unavailable)
    }
}

fn unavailable(err: arboard::Error) -> RefinerError {
    log::warn!("clipboard access failed: {err}");
    RefinerError::ClipboardUnavailable(err.to_string())
}
