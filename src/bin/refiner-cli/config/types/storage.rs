use serde::{Deserialize, Serialize};

/// Location of `settings.json` and the pending handoff file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: Option<String>,
}
