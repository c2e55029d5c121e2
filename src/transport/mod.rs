//! Outbound transport subsystem.
//!
//! # Data Flow
//! ```text
//! CheckInClient
//!     → Transport::post (one JSON POST, bounded by a timeout)
//!     → TransportResponse (status < 400)
//!       or TransportError::Connect (no response at all)
//!       or TransportError::Http (response with status >= 400)
//! ```
//!
//! # Design Decisions
//! - One attempt per call; no retries at this layer
//! - Every call carries a deadline
//! - Header names are lower-cased so lookups are case-insensitive

pub mod http;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use http::HttpTransport;

/// Header map: lower-cased name → values in arrival order.
pub type Headers = BTreeMap<String, Vec<String>>;

/// A response received from the remote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// First value of the header `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }
}

/// First value of the header `name` in `headers`, case-insensitively.
pub fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .get(&name.to_ascii_lowercase())
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// Transport failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// No response was received (connect error, timeout, aborted body).
    #[error("Connection failed: {0}")]
    Connect(String),

    /// A response was received with a failure status.
    #[error("HTTP {status} response")]
    Http {
        status: u16,
        headers: Headers,
        body: Vec<u8>,
    },
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Capability to issue a single JSON POST.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        headers: &Headers,
        body: &Value,
        timeout: Duration,
    ) -> TransportResult<TransportResponse>;
}
