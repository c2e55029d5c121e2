//! In-memory response cache with optional JSON persistence.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::cache::{CacheError, CacheResult, ResponseCache};
use crate::checkin::types::CachedEntry;
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::observability::metrics;

/// A cached entry and the store-level expiry it was written with.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    entry: CachedEntry,
    expires_at: u64,
}

/// Live/expired counts for operator tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    pub total: usize,
    pub live: usize,
    pub expired: usize,
}

/// A thread-safe response cache.
///
/// Clones share the same underlying map. When a persistence path is set,
/// every `put`/`forget` is written through to disk.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, StoredEntry>>,
    persistence_path: Option<PathBuf>,
    clock: Arc<dyn Clock>,
    // Serializes file writes.
    write_lock: Arc<Mutex<()>>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            persistence_path,
            clock: Arc::new(SystemClock),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Build the store described by `[cache]`, loading the persisted file
    /// when a path is configured.
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        match &config.persistence_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::new(None)),
        }
    }

    /// Replace the clock used to decide expiry.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Load from file if it exists, otherwise start empty with that path.
    pub fn load_from_file(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();
        let cache = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let map: BTreeMap<String, StoredEntry> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                cache.inner.insert(k, v);
            }
            metrics::record_cache_size(cache.inner.len());
            tracing::info!(
                path = %path.display(),
                entries = cache.inner.len(),
                "Loaded response cache from file"
            );
        }
        Ok(cache)
    }

    /// Save to the persistence path, if one is configured.
    pub fn save_to_file(&self) -> CacheResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };

        let map: BTreeMap<_, _> = self
            .inner
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();

        // Each write gets its own temp file beside the target, so stores
        // sharing a path never rename each other's half-written file.
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer(&mut writer, &map)?;
            writer.flush()?;
        }
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::debug!(path = %path.display(), entries = map.len(), "Saved response cache");
        Ok(())
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Count live and expired entries.
    pub fn summary(&self) -> CacheSummary {
        let now = self.clock.now();
        let live = self
            .inner
            .iter()
            .filter(|r| r.value().expires_at > now)
            .count();
        let total = self.inner.len();
        CacheSummary {
            total,
            live,
            expired: total.saturating_sub(live),
        }
    }

    async fn persist(&self) -> CacheResult<()> {
        if self.persistence_path.is_none() {
            return Ok(());
        }
        let _guard = self.write_lock.lock().await;
        let cache = self.clone();
        tokio::task::spawn_blocking(move || cache.save_to_file())
            .await
            .map_err(|e| CacheError::Io(std::io::Error::other(e)))?
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.inner.len())
            .field("persistence_path", &self.persistence_path)
            .finish()
    }
}

#[async_trait]
impl ResponseCache for MemoryCache {
    async fn put(&self, key: &str, entry: CachedEntry, expires_at: u64) -> CacheResult<()> {
        self.inner
            .insert(key.to_string(), StoredEntry { entry, expires_at });
        metrics::record_cache_size(self.inner.len());
        self.persist().await
    }

    async fn get(&self, key: &str) -> CacheResult<Option<CachedEntry>> {
        let now = self.clock.now();
        Ok(self
            .inner
            .get(key)
            .filter(|r| r.value().expires_at > now)
            .map(|r| r.value().entry.clone()))
    }

    async fn forget(&self, key: &str) -> CacheResult<()> {
        if self.inner.remove(key).is_none() {
            return Ok(());
        }
        metrics::record_cache_size(self.inner.len());
        self.persist().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::types::{CheckInRequest, CheckInResult};
    use crate::clock::ManualClock;

    fn entry(expires_at: u64) -> CachedEntry {
        CachedEntry {
            result: CheckInResult::ServerError,
            expires_at,
            request_fingerprint: CheckInRequest::new().with("host", "example.com"),
        }
    }

    #[tokio::test]
    async fn test_cache_operations() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = MemoryCache::new(None).with_clock(clock.clone());

        // Initial check
        assert!(cache.get("k").await.unwrap().is_none());

        // Put
        cache.put("k", entry(1_300), 1_300).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(entry(1_300)));

        // Expired entries read as absent but are kept until overwritten
        clock.set(1_300);
        assert!(cache.get("k").await.unwrap().is_none());
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.summary(),
            CacheSummary {
                total: 1,
                live: 0,
                expired: 1
            }
        );
    }

    #[tokio::test]
    async fn test_forget_is_idempotent() {
        let cache = MemoryCache::new(None);
        cache.forget("missing").await.unwrap();

        cache.put("k", entry(u64::MAX), u64::MAX).await.unwrap();
        cache.forget("k").await.unwrap();
        cache.forget("k").await.unwrap();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache = MemoryCache::new(None);
        let other = cache.clone();
        cache.put("k", entry(u64::MAX), u64::MAX).await.unwrap();
        assert!(other.get("k").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_persistence() {
        let path = "test_response_cache_persistence.json";

        let cache = MemoryCache::new(Some(PathBuf::from(path)));
        cache.put("k", entry(u64::MAX), u64::MAX).await.unwrap();

        // Load new instance
        let loaded = MemoryCache::load_from_file(path).unwrap();
        assert_eq!(loaded.get("k").await.unwrap(), Some(entry(u64::MAX)));

        // Forget writes through as well
        loaded.forget("k").await.unwrap();
        let reloaded = MemoryCache::load_from_file(path).unwrap();
        assert!(reloaded.is_empty());

        // Cleanup
        std::fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn test_from_config() {
        let cache = MemoryCache::from_config(&CacheConfig::default()).unwrap();
        assert!(cache.persistence_path.is_none());

        let path = "test_response_cache_from_config.json";
        let cache = MemoryCache::from_config(&CacheConfig {
            persistence_path: Some(path.to_string()),
        })
        .unwrap();
        assert_eq!(cache.persistence_path.as_deref(), Some(Path::new(path)));
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stores_sharing_a_path() {
        let path = "test_response_cache_shared.json";
        let first = MemoryCache::new(Some(PathBuf::from(path)));
        let second = MemoryCache::new(Some(PathBuf::from(path)));

        let mut handles = Vec::new();
        for i in 0..100 {
            for cache in [first.clone(), second.clone()] {
                handles.push(tokio::spawn(async move {
                    cache.put(&format!("k{i}"), entry(u64::MAX), u64::MAX).await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Last writer wins, but the file is always whole
        let loaded = MemoryCache::load_from_file(path).unwrap();
        assert!(!loaded.is_empty());

        std::fs::remove_file(path).unwrap_or_default();
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = "test_response_cache_corrupt.json";
        std::fs::write(path, "{not json").unwrap();

        let result = MemoryCache::load_from_file(path);
        assert!(matches!(result, Err(crate::cache::CacheError::Serialization(_))));

        std::fs::remove_file(path).unwrap_or_default();
    }
}
