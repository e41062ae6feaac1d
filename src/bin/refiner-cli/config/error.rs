use std::io;

/// Failures reading or writing `~/.config/prompt-refiner/config.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read or write config.toml: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config.toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cannot serialize settings to config.toml: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("no home directory to place ~/.config/prompt-refiner in")]
    MissingHome,
    #[error("[history] limit in config.toml must be at least 1")]
    ZeroHistoryLimit,
}
