//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts, TTLs)
//! - Validate endpoint and metrics addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// Upper bound on the check-in timeout.
pub const MAX_TIMEOUT_SECS: u64 = 60;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("checkin.endpoint '{0}' is not a valid http(s) URL")]
    InvalidEndpoint(String),

    #[error("checkin.timeout_secs must be between 1 and {max}, got {0}", max = MAX_TIMEOUT_SECS)]
    InvalidTimeout(u64),

    #[error("checkin.cache_key must not be empty")]
    EmptyCacheKey,

    #[error("checkin.ttl.{0} must be greater than zero")]
    ZeroTtl(&'static str),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let checkin = &config.checkin;

    match Url::parse(&checkin.endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        _ => errors.push(ValidationError::InvalidEndpoint(checkin.endpoint.clone())),
    }

    if checkin.timeout_secs == 0 || checkin.timeout_secs > MAX_TIMEOUT_SECS {
        errors.push(ValidationError::InvalidTimeout(checkin.timeout_secs));
    }

    if checkin.cache_key.trim().is_empty() {
        errors.push(ValidationError::EmptyCacheKey);
    }

    let ttl = &checkin.ttl;
    for (name, secs) in [
        ("success_secs", ttl.success_secs),
        ("validation_secs", ttl.validation_secs),
        ("server_error_secs", ttl.server_error_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::ZeroTtl(name));
        }
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
