use serde::{Deserialize, Serialize};

use prompt_refiner::client::DEFAULT_BASE_URL;

/// Where the refinement service listens.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Per-request timeout; unset waits as long as the service takes.
    pub timeout_seconds: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: None,
        }
    }
}
