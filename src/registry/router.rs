//! Reference routing across named repositories.
//!
//! # Design Decisions
//! - Repositories are tried in registration order; first hit wins
//! - Replacing a handle keeps its original position
//! - An unknown handle is an explicit miss, never a fallback scan

use std::fmt;
use std::sync::Arc;

/// Separator between handle and id in a reference.
pub const HANDLE_SEPARATOR: &str = "::";

/// A source of entities addressable by id.
pub trait Repository<E>: Send + Sync {
    fn find(&self, id: &str) -> Option<E>;
}

impl<E, F> Repository<E> for F
where
    F: Fn(&str) -> Option<E> + Send + Sync,
{
    fn find(&self, id: &str) -> Option<E> {
        self(id)
    }
}

/// Split `"handle::id"` into its parts. Only the first separator counts, so
/// ids may themselves contain `::`. A bare id, or one with an empty handle
/// (`"::id"`), has no handle.
pub fn split_reference(reference: &str) -> (Option<&str>, &str) {
    match reference.split_once(HANDLE_SEPARATOR) {
        Some((handle, id)) if !handle.is_empty() => (Some(handle), id),
        Some((_, id)) => (None, id),
        None => (None, reference),
    }
}

/// Dispatches references to registered repositories.
pub struct EntityRouter<E> {
    repositories: Vec<(String, Arc<dyn Repository<E>>)>,
}

impl<E> EntityRouter<E> {
    pub fn new() -> Self {
        Self {
            repositories: Vec::new(),
        }
    }

    /// Register `repository` under `handle`, replacing any previous one.
    pub fn set_repository(
        &mut self,
        handle: impl Into<String>,
        repository: Arc<dyn Repository<E>>,
    ) -> &mut Self {
        let handle = handle.into();
        match self.repositories.iter_mut().find(|(h, _)| *h == handle) {
            Some(slot) => slot.1 = repository,
            None => self.repositories.push((handle, repository)),
        }
        self
    }

    pub fn repository(&self, handle: &str) -> Option<&Arc<dyn Repository<E>>> {
        self.repositories
            .iter()
            .find(|(h, _)| h == handle)
            .map(|(_, repository)| repository)
    }

    /// Registered handles in registration order.
    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.repositories.iter().map(|(h, _)| h.as_str())
    }

    /// Resolve a bare id or a `"handle::id"` reference.
    pub fn find(&self, reference: &str) -> Option<E> {
        match split_reference(reference) {
            (Some(handle), id) => self.repository(handle)?.find(id),
            (None, id) => self
                .repositories
                .iter()
                .find_map(|(_, repository)| repository.find(id)),
        }
    }
}

impl<E> Default for EntityRouter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EntityRouter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityRouter")
            .field("handles", &self.handles().collect::<Vec<_>>())
            .finish()
    }
}
