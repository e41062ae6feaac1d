use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::task::JoinHandle;

use prompt_refiner::bridge::{serve_page, ChannelPageBridge, PageDocument};

/// A page snapshot on disk, served to the session through the page bridge
/// the way a content script serves a live tab.
pub struct PageFile {
    path: PathBuf,
    task: JoinHandle<PageDocument>,
}

impl PageFile {
    pub fn open(path: &Path) -> anyhow::Result<(Self, ChannelPageBridge)> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading page snapshot {}", path.display()))?;
        let document: PageDocument = serde_json::from_str(&contents)
            .with_context(|| format!("parsing page snapshot {}", path.display()))?;
        let (bridge, receiver) = ChannelPageBridge::channel(8);
        let task = tokio::spawn(serve_page(receiver, document));
        Ok((
            Self {
                path: path.to_path_buf(),
                task,
            },
            bridge,
        ))
    }

    /// Waits until every bridge handle is gone, then writes the page back if
    /// a field was replaced. Returns whether the file changed.
    pub async fn close(self) -> anyhow::Result<bool> {
        let document = self.task.await.context("page task panicked")?;
        if document.events.is_empty() {
            return Ok(false);
        }
        let json = serde_json::to_string_pretty(&document)?;
        fs::write(&self.path, json)
            .with_context(|| format!("saving page snapshot {}", self.path.display()))?;
        log::debug!(
            "saved page snapshot {} after {} write(s)",
            self.path.display(),
            document.events.len()
        );
        Ok(true)
    }
}
