use serde::{Deserialize, Serialize};

use super::{HistoryConfig, LoggingConfig, ServiceConfig, StorageConfig};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub history: HistoryConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}
