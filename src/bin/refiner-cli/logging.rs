use std::path::{Path, PathBuf};

use flexi_logger::{
    detailed_format, Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming,
};

use crate::config::{ConfigPaths, LoggingConfig};

const DEFAULT_LOG_STEM: &str = "refiner";

/// Starts file logging. The returned handle must outlive the command so
/// buffered lines are flushed on exit.
pub fn init_logging(config: &LoggingConfig, paths: &ConfigPaths) -> anyhow::Result<LoggerHandle> {
    let (directory, basename) = log_target(config.path.as_deref(), &paths.logs_dir);
    let handle = Logger::try_with_env_or_str(&config.level)?
        .log_to_file(FileSpec::default().directory(directory).basename(basename))
        .format(detailed_format)
        .append()
        .rotate(
            Criterion::Size(config.rotate_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.rotate_keep),
        )
        .start()?;
    Ok(handle)
}

/// Directory and file stem for the log file; `[logging] path` wins over the
/// default `refiner.log` in the logs dir.
fn log_target(configured: Option<&str>, logs_dir: &Path) -> (PathBuf, String) {
    let log_path = configured
        .map(PathBuf::from)
        .unwrap_or_else(|| logs_dir.join(format!("{DEFAULT_LOG_STEM}.log")));
    let directory = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| logs_dir.to_path_buf());
    let basename = log_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(DEFAULT_LOG_STEM)
        .to_string();
    (directory, basename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_refiner_log_in_logs_dir() {
        let (dir, stem) = log_target(None, Path::new("/data/logs"));
        assert_eq!(dir, PathBuf::from("/data/logs"));
        assert_eq!(stem, "refiner");
    }

    #[test]
    fn bare_file_name_stays_in_logs_dir() {
        let (dir, stem) = log_target(Some("session.log"), Path::new("/data/logs"));
        assert_eq!(dir, PathBuf::from("/data/logs"));
        assert_eq!(stem, "session");
    }

    #[test]
    fn configured_path_wins() {
        let (dir, stem) = log_target(Some("/var/log/refine/out.log"), Path::new("/data/logs"));
        assert_eq!(dir, PathBuf::from("/var/log/refine"));
        assert_eq!(stem, "out");
    }
}
