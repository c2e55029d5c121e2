//! Response cache store.
//!
//! # Responsibilities
//! - Keyed storage of fingerprinted check-in results
//! - Treat entries past their expiry as absent
//! - Surface storage failures to the caller instead of masking them

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::checkin::types::CachedEntry;

pub use memory::{CacheSummary, MemoryCache};

/// Errors raised by a cache store.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// TTL-aware key/value store for check-in responses.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Store `entry` under `key` until `expires_at` (unix seconds).
    async fn put(&self, key: &str, entry: CachedEntry, expires_at: u64) -> CacheResult<()>;

    /// Fetch the entry under `key`, if present and not expired.
    async fn get(&self, key: &str) -> CacheResult<Option<CachedEntry>>;

    /// Delete the entry under `key`. Deleting an absent key is not an error.
    async fn forget(&self, key: &str) -> CacheResult<()>;
}
