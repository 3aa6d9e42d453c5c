use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
