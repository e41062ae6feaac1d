use std::path::{Path, PathBuf};

use super::error::ConfigError;

const APP_DIR: &str = "prompt-refiner";

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    pub config_dir: PathBuf,
    /// Holds `settings.json` and the pending handoff.
    pub data_dir: PathBuf,
    pub logs_dir: PathBuf,
}

impl ConfigPaths {
    pub fn resolve(config_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::MissingHome)?;
        let mut paths = Self::under(&home);
        if let Some(path) = config_override {
            paths.config_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            paths.config_file = path;
        }
        Ok(paths)
    }

    /// XDG-style layout rooted at `home`.
    pub fn under(home: &Path) -> Self {
        let config_dir = home.join(".config").join(APP_DIR);
        let data_dir = home.join(".local").join("share").join(APP_DIR);
        Self {
            config_file: config_dir.join("config.toml"),
            config_dir,
            logs_dir: data_dir.join("logs"),
            data_dir,
        }
    }

    /// Points settings and handoff storage somewhere else; logs stay put.
    pub fn with_data_dir(mut self, data_dir: Option<&str>) -> Self {
        if let Some(dir) = data_dir {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }
}
