//! Entity lookup subsystem.
//!
//! # Data Flow
//! ```text
//! "handle::id"  → router.rs (split) → named Repository::find(id)
//! "id"          → router.rs → each Repository::find(id) in order, first hit
//! ```

pub mod router;

pub use router::{split_reference, EntityRouter, Repository};
