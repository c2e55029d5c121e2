//! Remote check-in client with policy-driven response caching.

pub mod cache;
pub mod checkin;
pub mod clock;
pub mod config;
pub mod observability;
pub mod registry;
pub mod transport;

pub use cache::{MemoryCache, ResponseCache};
pub use checkin::{CheckInClient, CheckInError, CheckInRequest, CheckInResult};
pub use config::ClientConfig;
pub use transport::{HttpTransport, Transport};
