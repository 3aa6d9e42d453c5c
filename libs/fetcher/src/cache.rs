use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// A single cached response body plus its freshness bookkeeping.
///
/// `ttl` is seconds; an entry with `ttl <= 0` never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub value: String,
    pub created_at: u64,
    pub ttl: i64,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, ttl: i64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            created_at: now_unix(),
            ttl,
        }
    }

    pub fn is_fresh(&self, now: u64) -> bool {
        if self.ttl <= 0 {
            return true;
        }
        now.saturating_sub(self.created_at) <= self.ttl as u64
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Escapes a cache key so it is safe to use as a filename.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Builds a deterministic cache key from endpoint path and sorted query params.
pub fn cache_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);
    let mut key = endpoint.to_string();
    if !sorted.is_empty() {
        key.push('?');
        key.push_str(
            &sorted
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&"),
        );
    }
    sanitize_key(&key)
}

/// In-memory LRU tier, bounded by `capacity` entries.
struct MemoryTier {
    capacity: usize,
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

impl MemoryTier {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key.to_string());
    }

    fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.get(key).cloned();
        if entry.is_some() {
            self.touch(key);
        }
        entry
    }

    fn insert(&mut self, entry: CacheEntry) {
        let key = entry.key.clone();
        self.entries.insert(key.clone(), entry);
        self.touch(&key);
        while self.entries.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            } else {
                break;
            }
        }
    }
}

/// Two-tier cache: memory LRU backed by a disk mirror, matching the shape of
/// the original `CacheManager`/`MultiLevelCache` pair, minus the pickle
/// encoding (we use JSON throughout).
pub struct LayeredCache {
    memory: MemoryTier,
    disk_dir: Option<PathBuf>,
}

impl LayeredCache {
    pub fn new(memory_capacity: usize, disk_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = &disk_dir {
            if let Err(e) = std::fs::create_dir_all(dir) {
                warn!("failed to create cache dir {}: {}", dir.display(), e);
            }
        }
        Self {
            memory: MemoryTier::new(memory_capacity),
            disk_dir,
        }
    }

    fn disk_path(&self, key: &str) -> Option<PathBuf> {
        self.disk_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.cache", sanitize_key(key))))
    }

    /// Fresh hit only; stale entries are not returned here.
    pub fn get_fresh(&mut self, key: &str) -> Option<CacheEntry> {
        let now = now_unix();
        if let Some(entry) = self.memory.get(key) {
            if entry.is_fresh(now) {
                return Some(entry);
            }
        }
        if let Some(entry) = self.read_disk(key) {
            if entry.is_fresh(now) {
                self.memory.insert(entry.clone());
                return Some(entry);
            }
        }
        None
    }

    /// Returns any known value regardless of expiry (for stale fallback).
    pub fn get_stale(&mut self, key: &str) -> Option<CacheEntry> {
        if let Some(entry) = self.memory.get(key) {
            return Some(entry);
        }
        self.read_disk(key)
    }

    pub fn put(&mut self, entry: CacheEntry) {
        self.write_disk(&entry);
        self.memory.insert(entry);
    }

    pub fn len(&self) -> usize {
        self.memory.entries.len()
    }

    fn read_disk(&self, key: &str) -> Option<CacheEntry> {
        let path = self.disk_path(key)?;
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<CacheEntry>(&contents) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("corrupt cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_disk(&self, entry: &CacheEntry) {
        let Some(path) = self.disk_path(&entry.key) else {
            return;
        };
        let Ok(json) = serde_json::to_string(entry) else {
            return;
        };
        // Write to a temp file then rename, so a crash never leaves a
        // partially-written entry for a reader to trip over.
        let tmp = path.with_extension("cache.tmp");
        if let Err(e) = std::fs::write(&tmp, json) {
            warn!("failed to write cache temp file {}: {}", tmp.display(), e);
            return;
        }
        if let Err(e) = std::fs::rename(&tmp, &path) {
            warn!("failed to rename cache file into place {}: {}", path.display(), e);
        } else {
            debug!("wrote cache entry {}", path.display());
        }
    }
}

/// Selects a default TTL (seconds) for a given date relative to today, per
/// the cache-TTL-selection rule: past → 1h, today → 5m, future → 30m.
pub fn ttl_for_date(days_from_today: i64) -> i64 {
    if days_from_today < 0 {
        3600
    } else if days_from_today == 0 {
        300
    } else {
        1800
    }
}

pub fn cache_dir_for(base: &Path, league: &str) -> PathBuf {
    base.join(league)
}

pub type CacheResult<T> = Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic_regardless_of_param_order() {
        let a = cache_key("/scoreboard", &[("dates", "20260101"), ("group", "50")]);
        let b = cache_key("/scoreboard", &[("group", "50"), ("dates", "20260101")]);
        assert_eq!(a, b);
    }

    #[test]
    fn sanitize_strips_unsafe_chars() {
        assert_eq!(sanitize_key("/v1/score/2026-01-01"), "_v1_score_2026-01-01");
    }

    #[test]
    fn fresh_within_ttl_expired_after() {
        let mut entry = CacheEntry::new("k", "v", 10);
        assert!(entry.is_fresh(entry.created_at + 5));
        assert!(!entry.is_fresh(entry.created_at + 11));
        entry.ttl = 0;
        assert!(entry.is_fresh(entry.created_at + 1_000_000));
    }

    #[test]
    fn memory_tier_evicts_oldest() {
        let mut tier = MemoryTier::new(2);
        tier.insert(CacheEntry::new("a", "1", 100));
        tier.insert(CacheEntry::new("b", "2", 100));
        tier.insert(CacheEntry::new("c", "3", 100));
        assert!(tier.get("a").is_none());
        assert!(tier.get("b").is_some());
        assert!(tier.get("c").is_some());
    }

    #[test]
    fn layered_cache_roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = LayeredCache::new(1, Some(dir.path().to_path_buf()));
        cache.put(CacheEntry::new("k", "payload", 100));
        // New cache instance sharing the same disk dir should still see it.
        let mut cache2 = LayeredCache::new(1, Some(dir.path().to_path_buf()));
        let entry = cache2.get_fresh("k").expect("disk hit");
        assert_eq!(entry.value, "payload");
    }

    #[test]
    fn ttl_selection_matches_date_bucket() {
        assert_eq!(ttl_for_date(-1), 3600);
        assert_eq!(ttl_for_date(0), 300);
        assert_eq!(ttl_for_date(1), 1800);
    }
}
