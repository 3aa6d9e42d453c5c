use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardsError {
    #[error("failed to read plugin manifest: {0}")]
    ManifestIo(#[from] std::io::Error),

    #[error("failed to parse plugin manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),

    #[error("unknown board kind: {0}")]
    UnknownKind(String),

    #[error("sink flush failed: {0}")]
    SinkFlush(String),
}

pub type Result<T> = std::result::Result<T, BoardsError>;
