//! Metrics collection and exposition.
//!
//! # Metrics
//! - `checkin_requests_total` (counter): outbound check-ins by classified outcome
//! - `checkin_cache_lookups_total` (counter): lookups by result (memo, hit, mismatch, miss)
//! - `checkin_cache_write_failures_total` (counter): cache writes that failed
//! - `checkin_cache_entries` (gauge): entries held by the in-memory store
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Register metric descriptions.
pub fn describe() {
    describe_counter!(
        "checkin_requests_total",
        "Outbound check-in requests by classified outcome"
    );
    describe_counter!(
        "checkin_cache_lookups_total",
        "Check-in cache lookups by result"
    );
    describe_counter!(
        "checkin_cache_write_failures_total",
        "Check-in results that could not be written to the cache"
    );
    describe_gauge!("checkin_cache_entries", "Entries held by the response cache");
}

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe();
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_checkin_outcome(outcome: &'static str) {
    counter!("checkin_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_lookup(result: &'static str) {
    counter!("checkin_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_write_failure() {
    counter!("checkin_cache_write_failures_total").increment(1);
}

pub fn record_cache_size(entries: usize) {
    gauge!("checkin_cache_entries").set(entries as f64);
}
