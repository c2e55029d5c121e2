//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! CheckInClient / cache store produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr (fmt subscriber, EnvFilter)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```

pub mod logging;
pub mod metrics;
