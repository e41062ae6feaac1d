//! Text capture from, and injection into, the frontmost page.
//!
//! The page lives in another context: every page operation is an
//! asynchronous call that may be refused with
//! [`RefinerError::PageAccessDenied`]. Nothing here retries or times out.

mod page;
mod rpc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RefinerError;

pub use page::{ElementKind, PageDocument, PageElement, PageEvent};
pub use rpc::{serve_page, ChannelPageBridge, PageCall, PageRequest, PageResponse, PageScript};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureKind {
    Clipboard,
    PageSelection,
    ActiveField,
}

/// Remote calls executed in the page's context.
#[async_trait]
pub trait PageBridge: Send + Sync {
    async fn get_selection(&self) -> Result<String, RefinerError>;

    /// Text of the focused field, or the best-guess text area when nothing
    /// editable has focus.
    async fn get_active_field(&self) -> Result<Option<String>, RefinerError>;

    /// Writes into the focused or first visible field. `false` means the page
    /// had no target.
    async fn replace_active_field(&self, text: &str) -> Result<bool, RefinerError>;
}

#[async_trait]
pub trait ClipboardSource: Send + Sync {
    async fn read_text(&self) -> Result<String, RefinerError>;
    async fn write_text(&self, text: &str) -> Result<(), RefinerError>;
}

/// Reads text from the requested source, trimmed.
pub async fn capture(
    kind: CaptureKind,
    page: &dyn PageBridge,
    clipboard: &dyn ClipboardSource,
) -> Result<String, RefinerError> {
    match kind {
        CaptureKind::Clipboard => {
            let text = clipboard.read_text().await?;
            non_blank(text).ok_or(RefinerError::EmptyClipboard)
        }
        CaptureKind::PageSelection => {
            let text = page.get_selection().await?;
            non_blank(text).ok_or(RefinerError::NoTextFound)
        }
        CaptureKind::ActiveField => page
            .get_active_field()
            .await?
            .and_then(non_blank)
            .ok_or(RefinerError::NoTextFound),
    }
}

pub async fn inject(page: &dyn PageBridge, text: &str) -> Result<(), RefinerError> {
    if page.replace_active_field(text).await? {
        Ok(())
    } else {
        Err(RefinerError::NoTarget)
    }
}

fn non_blank(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Clipboard that never leaves the process.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: std::sync::Mutex<String>,
}

impl MemoryClipboard {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: std::sync::Mutex::new(text.into()),
        }
    }

    pub fn contents(&self) -> String {
        self.text.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ClipboardSource for MemoryClipboard {
    async fn read_text(&self) -> Result<String, RefinerError> {
        Ok(self.contents())
    }

    async fn write_text(&self, text: &str) -> Result<(), RefinerError> {
        let mut current = self
            .text
            .lock()
            .map_err(|e| RefinerError::Storage(e.to_string()))?;
        *current = text.to_string();
        Ok(())
    }
}

/// Page bridge used when no page is attached; every call is refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedPage;

#[async_trait]
impl PageBridge for DetachedPage {
    async fn get_selection(&self) -> Result<String, RefinerError> {
        Err(RefinerError::PageAccessDenied)
    }

    async fn get_active_field(&self) -> Result<Option<String>, RefinerError> {
        Err(RefinerError::PageAccessDenied)
    }

    async fn replace_active_field(&self, _text: &str) -> Result<bool, RefinerError> {
        Err(RefinerError::PageAccessDenied)
    }
}
