use serde::{Deserialize, Serialize};

use super::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}
