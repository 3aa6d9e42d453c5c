use thiserror::Error;

/// Errors surfaced by [`crate::ResilientFetcher`].
///
/// Per the propagation policy, network and HTTP failures never reach this far —
/// they are absorbed into a `None` return from `get`. This enum only covers
/// failures that indicate a programming or filesystem problem.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("cache directory io error: {0}")]
    CacheIo(#[from] std::io::Error),

    #[error("cache entry corrupt: {0}")]
    CacheCorrupt(String),
}

pub type Result<T> = std::result::Result<T, FetchError>;
