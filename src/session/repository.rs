//! Session store trait.

use async_trait::async_trait;
use chrono::Duration;

use super::Session;
use crate::SessionError;

/// Storage for visitor sessions.
///
/// The store is the only owner of session records. Callers receive
/// snapshots; every mutation goes through these operations.
///
/// Implementations:
/// - [`InMemorySessionStore`](super::InMemorySessionStore): a single lock-guarded map
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Creates a new session and returns its id.
    ///
    /// Fails only when no random id can be generated.
    async fn create(&self) -> Result<String, SessionError>;

    /// Looks up a session and marks it as accessed now.
    ///
    /// Returns `None` for unknown ids.
    async fn get(&self, session_id: &str) -> Option<Session>;

    /// Removes sessions not accessed within `max_idle`.
    ///
    /// Returns the number of sessions pruned.
    async fn prune_idle(&self, max_idle: Duration) -> usize;

    /// Returns the number of sessions currently stored.
    async fn len(&self) -> usize;

    /// Returns true if no sessions are stored.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
