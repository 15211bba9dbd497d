use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for HTTP response caching
#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub enabled: bool, // false when --no-cache
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// Get the platform-appropriate cache directory for prism
pub fn get_cache_path() -> PathBuf {
    dirs::cache_dir()
        .map(|p| p.join("prism/http-cache"))
        .unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}/.cache/prism/http-cache",
                std::env::var("HOME").unwrap_or_default()
            ))
        })
}

/// Clear the HTTP cache directory
pub fn clear_cache() -> Result<()> {
    let cache_path = get_cache_path();
    match std::fs::remove_dir_all(&cache_path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).context("Failed to remove cache directory"),
    }
}

/// Cache key for one kind of response about one subject, e.g. `chart:2y:MSFT`.
pub fn cache_key(kind: &str, subject: &str) -> String {
    format!("{}:{}", kind, subject)
}

#[derive(Serialize, Deserialize)]
struct CacheEntry<T> {
    stored_at: i64, // Unix timestamp
    value: T,
}

/// Whether an entry stored at `stored_at` is still within `ttl` at `now`.
pub fn is_fresh(stored_at: i64, now: i64, ttl: Duration) -> bool {
    let age = now.saturating_sub(stored_at);
    age >= 0 && (age as u64) < ttl.as_secs()
}

/// Disk cache of parsed responses, stored as JSON in a cacache directory.
///
/// Entries older than the TTL are ignored (and overwritten on the next fetch).
#[derive(Clone, Debug)]
pub struct DiskCache {
    cache_path: PathBuf,
    config: CacheConfig,
}

impl DiskCache {
    pub fn new(cache_path: PathBuf, config: CacheConfig) -> Self {
        Self { cache_path, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.config.enabled {
            return None;
        }
        let bytes = cacache::read_sync(&self.cache_path, key).ok()?;
        let entry: CacheEntry<T> = serde_json::from_slice(&bytes).ok()?;
        if is_fresh(entry.stored_at, chrono::Utc::now().timestamp(), self.config.ttl) {
            Some(entry.value)
        } else {
            None
        }
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        let entry = CacheEntry {
            stored_at: chrono::Utc::now().timestamp(),
            value,
        };
        let json = serde_json::to_vec(&entry)?;
        cacache::write_sync(&self.cache_path, key, &json)
            .with_context(|| format!("Failed to write cache entry {}", key))?;
        Ok(())
    }
}
