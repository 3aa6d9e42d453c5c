use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::cache::{cache_key, CacheEntry, LayeredCache};
use crate::circuit::{CircuitBreaker, CircuitState};
use crate::retry::{backoff_delay, is_retryable_status, MAX_ATTEMPTS};

/// Point-in-time health snapshot, per C1's observability contract.
#[derive(Debug, Clone)]
pub struct FetcherStatus {
    pub state: CircuitState,
    pub failure_count: u32,
    pub last_failure_at: Option<u64>,
    pub cache_entries: usize,
}

/// Configuration for a single [`ResilientFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub base_url: String,
    pub cache_dir: Option<PathBuf>,
    pub memory_cache_capacity: usize,
    pub circuit_failure_threshold: u32,
    pub circuit_recovery_timeout_secs: u64,
    pub default_ttl_secs: i64,
    pub request_timeout: Duration,
}

impl FetcherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cache_dir: None,
            memory_cache_capacity: 256,
            circuit_failure_threshold: 5,
            circuit_recovery_timeout_secs: 60,
            default_ttl_secs: 300,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP fetcher with layered cache, retry/backoff, and a circuit breaker
/// guarding a single upstream base URL.
pub struct ResilientFetcher {
    http: Client,
    base_url: String,
    cache: LayeredCache,
    circuit: CircuitBreaker,
    default_ttl_secs: i64,
    timeout: Duration,
}

impl ResilientFetcher {
    pub fn new(config: FetcherConfig) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: config.base_url,
            cache: LayeredCache::new(config.memory_cache_capacity, config.cache_dir),
            circuit: CircuitBreaker::new(
                config.circuit_failure_threshold,
                config.circuit_recovery_timeout_secs,
            ),
            default_ttl_secs: config.default_ttl_secs,
            timeout: config.request_timeout,
        }
    }

    pub fn status(&self) -> FetcherStatus {
        FetcherStatus {
            state: self.circuit.state(),
            failure_count: self.circuit.failure_count(),
            last_failure_at: self.circuit.last_failure_at(),
            cache_entries: self.cache.len(),
        }
    }

    /// Fetches `endpoint` with the resilience policies described in C1.
    /// Never returns an `Err` for network/HTTP problems — those degrade to
    /// `Ok(None)` (or stale data when `allow_stale` is set).
    pub async fn get(
        &mut self,
        endpoint: &str,
        params: &[(&str, &str)],
        ttl_override: Option<i64>,
        allow_stale: bool,
    ) -> Option<String> {
        let key = cache_key(endpoint, params);

        if let Some(entry) = self.cache.get_fresh(&key) {
            debug!("cache hit for {}", key);
            return Some(entry.value);
        }

        if self.circuit.should_block() {
            warn!("circuit breaker OPEN, skipping request to {}", endpoint);
            return self.stale_fallback(&key, allow_stale);
        }

        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );

        match self.fetch_with_retry(&url, params).await {
            Some(body) => {
                self.circuit.record_success();
                let ttl = ttl_override.unwrap_or(self.default_ttl_secs);
                self.cache.put(CacheEntry::new(&key, &body, ttl));
                Some(body)
            }
            None => {
                self.circuit.record_failure();
                self.stale_fallback(&key, allow_stale)
            }
        }
    }

    fn stale_fallback(&mut self, key: &str, allow_stale: bool) -> Option<String> {
        if !allow_stale {
            return None;
        }
        self.cache.get_stale(key).map(|entry| {
            warn!("returning stale cache for {}", key);
            entry.value
        })
    }

    async fn fetch_with_retry(&self, url: &str, params: &[(&str, &str)]) -> Option<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            info!("fetching {} (attempt {}/{})", url, attempt, MAX_ATTEMPTS);
            let request = self.http.get(url).query(params).timeout(self.timeout);
            let response = match request.send().await {
                Ok(r) => r,
                Err(e) => {
                    warn!("request error for {}: {}", url, e);
                    if attempt >= MAX_ATTEMPTS {
                        return None;
                    }
                    tokio::time::sleep(backoff_delay(attempt, None)).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                return response.text().await.ok();
            }

            if !is_retryable_status(status.as_u16()) || attempt >= MAX_ATTEMPTS {
                warn!("non-retryable or exhausted status {} from {}", status, url);
                return None;
            }

            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);

            tokio::time::sleep(backoff_delay(attempt, retry_after)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_circuit_and_cache() {
        let fetcher = ResilientFetcher::new(FetcherConfig::new("https://example.com"));
        let status = fetcher.status();
        assert_eq!(status.state, CircuitState::Closed);
        assert_eq!(status.failure_count, 0);
        assert_eq!(status.cache_entries, 0);
    }

    #[tokio::test]
    async fn cache_hit_avoids_network_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = FetcherConfig::new("http://127.0.0.1:1"); // unroutable
        config.cache_dir = Some(dir.path().to_path_buf());
        let mut fetcher = ResilientFetcher::new(config);
        fetcher
            .cache
            .put(CacheEntry::new(cache_key("/games", &[]), "cached-body", 300));
        let result = fetcher.get("/games", &[], None, false).await;
        assert_eq!(result.as_deref(), Some("cached-body"));
    }
}
