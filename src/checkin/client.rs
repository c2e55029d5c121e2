//! Check-in client with fingerprinted response caching.
//!
//! # Responsibilities
//! - Build the current payload and use it as the cache fingerprint
//! - Serve valid cached results without touching the network
//! - Issue one bounded POST on a miss and classify the outcome
//! - Store the classified result with a class-specific expiry

use arc_swap::ArcSwapOption;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{MemoryCache, ResponseCache};
use crate::checkin::classify::{classify, Classified};
use crate::checkin::payload::PayloadSource;
use crate::checkin::types::{CachedEntry, CheckInOutcome, CheckInRequest, CheckInResult};
use crate::clock::{Clock, SystemClock};
use crate::config::{CheckInConfig, ClientConfig};
use crate::observability::metrics;
use crate::transport::{Headers, HttpTransport, Transport};

/// Reports installation metadata and caches the classified response.
///
/// Safe to share between concurrent callers. Two callers racing on a cold
/// cache may both reach the remote; the later cache write wins.
pub struct CheckInClient {
    settings: CheckInConfig,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn ResponseCache>,
    payload: Arc<dyn PayloadSource>,
    clock: Arc<dyn Clock>,
    /// Last entry this instance produced or read.
    memo: ArcSwapOption<CachedEntry>,
}

impl CheckInClient {
    pub fn new(
        settings: CheckInConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn ResponseCache>,
        payload: Arc<dyn PayloadSource>,
    ) -> Self {
        Self {
            settings,
            transport,
            cache,
            payload,
            clock: Arc::new(SystemClock),
            memo: ArcSwapOption::empty(),
        }
    }

    /// Wire a client from configuration: reqwest transport, in-memory cache
    /// (persisted when a path is configured) and the configured installation.
    pub fn from_config(config: &ClientConfig) -> CheckInOutcome<Self> {
        let cache = MemoryCache::from_config(&config.cache)?;
        Ok(Self::from_config_with_cache(config, Arc::new(cache)))
    }

    /// Like [`from_config`](Self::from_config), around a cache handle the
    /// caller keeps.
    pub fn from_config_with_cache(config: &ClientConfig, cache: Arc<dyn ResponseCache>) -> Self {
        Self::new(
            config.checkin.clone(),
            Arc::new(HttpTransport::new()),
            cache,
            Arc::new(config.installation.clone()),
        )
    }

    /// Replace the clock used for expiry arithmetic.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &CheckInConfig {
        &self.settings
    }

    /// The request that the next check-in would send.
    pub fn payload(&self) -> CheckInRequest {
        self.payload.payload()
    }

    /// Current check-in status, from memory, the cache, or the remote.
    pub async fn status(&self) -> CheckInOutcome<CheckInResult> {
        let request = self.payload();
        let now = self.clock.now();

        if let Some(entry) = self.memo.load_full() {
            if entry.is_valid_for(&request, now) {
                metrics::record_cache_lookup("memo");
                return Ok(entry.result.clone());
            }
        }

        let key = &self.settings.cache_key;
        match self.cache.get(key).await? {
            Some(entry) if entry.is_valid_for(&request, now) => {
                tracing::debug!(
                    key = %key,
                    outcome = entry.result.outcome(),
                    expires_at = entry.expires_at,
                    "Check-in served from cache"
                );
                metrics::record_cache_lookup("hit");
                let result = entry.result.clone();
                self.memo.store(Some(Arc::new(entry)));
                return Ok(result);
            }
            Some(_) => {
                tracing::debug!(key = %key, "Cached check-in is expired or for a different payload");
                metrics::record_cache_lookup("mismatch");
            }
            None => {
                tracing::debug!(key = %key, "No cached check-in");
                metrics::record_cache_lookup("miss");
            }
        }

        let Classified { result, ttl_secs } = self.perform(&request).await?;
        metrics::record_checkin_outcome(result.outcome());

        let expires_at = self.clock.now().saturating_add(ttl_secs);
        let entry = CachedEntry {
            result: result.clone(),
            expires_at,
            request_fingerprint: request,
        };

        tracing::info!(
            outcome = result.outcome(),
            ttl_secs,
            expires_at,
            "Check-in completed"
        );

        if let Err(e) = self.cache.put(key, entry.clone(), expires_at).await {
            tracing::warn!(key = %key, error = %e, "Failed to cache check-in result");
            metrics::record_cache_write_failure();
        }
        self.memo.store(Some(Arc::new(entry)));

        Ok(result)
    }

    /// Memoized accessor; identical to [`status`](Self::status).
    pub async fn response(&self) -> CheckInOutcome<CheckInResult> {
        self.status().await
    }

    /// Check in and discard the result. Faults are logged, not returned.
    pub async fn radio(&self) {
        if let Err(e) = self.status().await {
            tracing::warn!(error = %e, "Check-in failed");
        }
    }

    /// Delete the cached response. Deleting an absent entry is a no-op.
    pub async fn clear_cache(&self) -> CheckInOutcome<()> {
        self.memo.store(None);
        self.cache.forget(&self.settings.cache_key).await?;
        tracing::info!(key = %self.settings.cache_key, "Check-in cache cleared");
        Ok(())
    }

    async fn perform(&self, request: &CheckInRequest) -> CheckInOutcome<Classified> {
        let mut headers: Headers = BTreeMap::new();
        headers.insert("accept".to_string(), vec!["application/json".to_string()]);

        let outcome = self
            .transport
            .post(
                &self.settings.endpoint,
                &headers,
                &request.to_value(),
                Duration::from_secs(self.settings.timeout_secs),
            )
            .await;

        classify(outcome, &self.settings.ttl)
    }
}

impl std::fmt::Debug for CheckInClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckInClient")
            .field("endpoint", &self.settings.endpoint)
            .field("cache_key", &self.settings.cache_key)
            .field("timeout_secs", &self.settings.timeout_secs)
            .finish()
    }
}
