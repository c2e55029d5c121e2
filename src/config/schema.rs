//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the check-in client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Remote endpoint and caching policy.
    pub checkin: CheckInConfig,

    /// Response cache store settings.
    pub cache: CacheConfig,

    /// Installation metadata reported on every check-in.
    pub installation: Installation,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote check-in endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckInConfig {
    /// Endpoint receiving the JSON POST.
    pub endpoint: String,

    /// Request timeout in seconds. Kept short, the call sits in a request path.
    pub timeout_secs: u64,

    /// Well-known key the response is cached under.
    pub cache_key: String,

    /// Expiry windows per response class.
    pub ttl: TtlConfig,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://outpost.example.com/v3/query".to_string(),
            timeout_secs: 5,
            cache_key: "checkin.outpost.response".to_string(),
            ttl: TtlConfig::default(),
        }
    }
}

/// Cache lifetimes in seconds. Rate-limited responses use the remote `Retry-After`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TtlConfig {
    /// Lifetime of a 2xx response.
    pub success_secs: u64,

    /// Lifetime of a 422 response.
    pub validation_secs: u64,

    /// Lifetime of a 5xx response or connect failure.
    pub server_error_secs: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            success_secs: 3600,
            validation_secs: 3600,
            server_error_secs: 300,
        }
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// JSON file the cache is persisted to. In-memory only when unset.
    pub persistence_path: Option<String>,
}

/// Metadata describing this installation.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Installation {
    /// License key, if one has been configured.
    pub license_key: Option<String>,

    /// Public host name the installation is served from.
    pub host: String,

    /// Server address.
    pub ip: Option<String>,

    /// Server port.
    pub port: Option<u16>,

    /// Product version.
    pub version: String,

    /// Whether the pro edition is enabled.
    pub pro: bool,

    /// Runtime version the product runs on.
    pub runtime_version: String,

    /// Installed packages keyed by package name.
    pub packages: BTreeMap<String, PackageInfo>,

    /// Additional opaque fields reported as-is.
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Version information for one installed package.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct PackageInfo {
    pub version: String,

    #[serde(default)]
    pub edition: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
