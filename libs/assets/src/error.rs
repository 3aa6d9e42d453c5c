use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetsError {
    #[error("failed to read team registry: {0}")]
    RegistryIo(#[from] std::io::Error),

    #[error("failed to parse team registry: {0}")]
    RegistryParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AssetsError>;
