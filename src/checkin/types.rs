//! Check-in request/result types and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::cache::CacheError;

/// The payload reported to the remote endpoint.
///
/// Doubles as the fingerprint of a cached response: two requests are the same
/// request iff their serialized content is equal. Keys are kept in sorted
/// order so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckInRequest(Map<String, Value>);

impl CheckInRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// JSON body sent to the remote endpoint.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for CheckInRequest {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Outcome of a check-in, as returned to callers and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckInResult {
    /// 2xx response with its parsed body.
    Success { data: Map<String, Value> },
    /// 422 response carrying the remote validation errors.
    ValidationError { errors: Map<String, Value> },
    /// 429 response.
    RateLimited,
    /// 5xx response or no response at all.
    ServerError,
}

impl CheckInResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CheckInResult::Success { .. })
    }

    /// Short label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            CheckInResult::Success { .. } => "success",
            CheckInResult::ValidationError { .. } => "validation_error",
            CheckInResult::RateLimited => "rate_limited",
            CheckInResult::ServerError => "server_error",
        }
    }
}

/// A classified result stamped with its expiry and the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub result: CheckInResult,
    /// Unix timestamp (seconds) after which the entry is treated as absent.
    pub expires_at: u64,
    pub request_fingerprint: CheckInRequest,
}

impl CachedEntry {
    /// Whether the entry may be reused for `request` at time `now`.
    pub fn is_valid_for(&self, request: &CheckInRequest, now: u64) -> bool {
        now < self.expires_at && self.request_fingerprint == *request
    }
}

/// Errors surfaced to check-in callers.
///
/// Connect failures and the documented remote failure statuses never appear
/// here; they are folded into a [`CheckInResult`].
#[derive(Debug, Error)]
pub enum CheckInError {
    /// The remote answered with a status outside the documented API.
    #[error("Unhandled check-in response status {status}: {body}")]
    UnhandledStatus { status: u16, body: String },

    /// A success response whose body is not a JSON object.
    #[error("Failed to decode check-in response: {0}")]
    Decode(String),

    /// The cache store failed to answer a lookup or delete.
    #[error("Response cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Result type for check-in operations.
pub type CheckInOutcome<T> = Result<T, CheckInError>;
