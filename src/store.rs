//! Persisted selection settings and the one-shot handoff slot.
//!
//! Settings are always written as a full snapshot so the stored file is
//! directly loadable on its own.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::RefinerError;

/// The stored form of a [`Configuration`](crate::selection::Configuration).
///
/// Every key is optional: a missing or stale value falls back to the catalog
/// default when the session starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub mode: Option<String>,
    pub toggles: Option<Vec<String>>,
    pub persona: Option<String>,
    pub temperature: Option<f32>,
    pub model: Option<String>,
    pub custom_instructions: Option<String>,
    pub pipeline: Option<String>,
}

pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<PersistedSettings, RefinerError>;
    /// Replaces the whole stored snapshot.
    fn save(&self, settings: &PersistedSettings) -> Result<(), RefinerError>;
}

/// Settings kept in a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<PersistedSettings, RefinerError> {
        match fs::read(&self.path) {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PersistedSettings::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, settings: &PersistedSettings) -> Result<(), RefinerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    inner: Mutex<PersistedSettings>,
    writes: Mutex<usize>,
}

impl MemorySettingsStore {
    pub fn new(settings: PersistedSettings) -> Self {
        Self {
            inner: Mutex::new(settings),
            writes: Mutex::new(0),
        }
    }

    pub fn snapshot(&self) -> PersistedSettings {
        self.inner.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Number of `save` calls seen so far.
    pub fn writes(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or_default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<PersistedSettings, RefinerError> {
        Ok(self.snapshot())
    }

    fn save(&self, settings: &PersistedSettings) -> Result<(), RefinerError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| RefinerError::Storage(e.to_string()))?;
        *inner = settings.clone();
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}

/// Capacity-one slot through which the context-menu launcher hands selected
/// page text to the next session.
///
/// A later `offer` replaces an unread value. `drain` empties the slot whether
/// or not it held anything.
pub trait HandoffSlot: Send + Sync {
    fn offer(&self, text: &str) -> Result<(), RefinerError>;
    fn drain(&self) -> Result<Option<String>, RefinerError>;
}

#[derive(Debug, Clone)]
pub struct FileHandoffSlot {
    path: PathBuf,
}

impl FileHandoffSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("pending.txt"))
    }
}

impl HandoffSlot for FileHandoffSlot {
    fn offer(&self, text: &str) -> Result<(), RefinerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text.trim())?;
        Ok(())
    }

    fn drain(&self) -> Result<Option<String>, RefinerError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        fs::remove_file(&self.path)?;
        // The file may have been written by something other than `offer`.
        let text = text.trim();
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryHandoffSlot {
    pending: Mutex<Option<String>>,
}

impl HandoffSlot for MemoryHandoffSlot {
    fn offer(&self, text: &str) -> Result<(), RefinerError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| RefinerError::Storage(e.to_string()))?;
        *pending = Some(text.trim().to_string());
        Ok(())
    }

    fn drain(&self) -> Result<Option<String>, RefinerError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|e| RefinerError::Storage(e.to_string()))?;
        Ok(pending.take().filter(|t| !t.is_empty()))
    }
}
