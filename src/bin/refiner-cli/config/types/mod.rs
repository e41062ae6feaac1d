mod app;
mod history;
mod logging;
mod service;
mod storage;

const DEFAULT_HISTORY_LIMIT: usize = 20;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_ROTATE_SIZE: u64 = 5 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 3;

pub use app::AppConfig;
pub use history::HistoryConfig;
pub use logging::LoggingConfig;
pub use service::ServiceConfig;
pub use storage::StorageConfig;
