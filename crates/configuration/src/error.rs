use thiserror::Error;

/// Everything that can go wrong while reading `config.toml` and its overrides.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file or an environment override could not be read or deserialized.
    #[error("Failed to load dashboard configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    /// Every source was readable, but a setting is out of range.
    #[error("Invalid dashboard setting: {0}")]
    ValidationError(String),
}
