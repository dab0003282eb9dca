use thiserror::Error;

/// Failures while loading the configuration. The process exits with the
/// startup status on any of them.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {reason}")]
    FileRead { path: String, reason: String },

    #[error("Invalid TOML in config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}
