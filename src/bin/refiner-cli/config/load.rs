use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use super::paths::ConfigPaths;
use super::types::AppConfig;

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub paths: ConfigPaths,
    pub config_exists: bool,
}

pub fn load_config(path_override: Option<PathBuf>) -> Result<LoadedConfig, ConfigError> {
    load_from(ConfigPaths::resolve(path_override)?)
}

fn load_from(paths: ConfigPaths) -> Result<LoadedConfig, ConfigError> {
    let (config, config_exists) = read_config(&paths.config_file)?;
    if config.history.limit == 0 {
        return Err(ConfigError::ZeroHistoryLimit);
    }
    let paths = paths.with_data_dir(config.storage.data_dir.as_deref());
    ensure_dirs(&paths)?;
    secure_file_permissions(&paths.config_file)?;
    Ok(LoadedConfig {
        config,
        paths,
        config_exists,
    })
}

fn read_config(path: &Path) -> Result<(AppConfig, bool), ConfigError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok((toml::from_str(&contents)?, true)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok((AppConfig::default(), false)),
        Err(err) => Err(ConfigError::Io(err)),
    }
}

pub(super) fn ensure_dirs(paths: &ConfigPaths) -> Result<(), ConfigError> {
    fs::create_dir_all(&paths.config_dir)?;
    fs::create_dir_all(&paths.data_dir)?;
    fs::create_dir_all(&paths.logs_dir)?;
    Ok(())
}

pub(super) fn secure_file_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mut perms = metadata.permissions();
            if perms.mode() & 0o077 != 0 {
                perms.set_mode(0o600);
                fs::set_permissions(path, perms)?;
            }
        }
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
