pub mod cache;
pub mod circuit;
pub mod client;
pub mod error;
pub mod retry;

pub use cache::{cache_key, ttl_for_date, CacheEntry, LayeredCache};
pub use circuit::{CircuitBreaker, CircuitState};
pub use client::{FetcherConfig, FetcherStatus, ResilientFetcher};
pub use error::{FetchError, Result};
