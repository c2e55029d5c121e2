//! Check-in subsystem.
//!
//! # Data Flow
//! ```text
//! Installation / PayloadSource
//!     → payload.rs (CheckInRequest, doubles as fingerprint)
//!     → client.rs (memo → ResponseCache lookup → Transport on miss)
//!     → classify.rs (outcome → CheckInResult + TTL)
//!     → client.rs (CachedEntry written under the fixed key)
//! ```
//!
//! # Design Decisions
//! - No hash is derived; the serialized payload is compared directly
//! - Stale or mismatched entries are bypassed and overwritten, never deleted
//! - Only `clear_cache` deletes the entry

pub mod classify;
pub mod client;
pub mod payload;
pub mod types;

pub use client::CheckInClient;
pub use payload::PayloadSource;
pub use types::{CachedEntry, CheckInError, CheckInOutcome, CheckInRequest, CheckInResult};
