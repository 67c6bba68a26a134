//! In-memory session storage.
//!
//! Sessions live for the lifetime of the process and are lost on restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::Session;
use super::repository::SessionStore;
use crate::SessionError;
use crate::crypto::generate_session_id;

type IdSource = fn() -> Result<String, SessionError>;

/// In-memory session storage.
///
/// Stores sessions in a `HashMap` behind a single `Mutex`. Lookups mutate
/// the access timestamp, so reads and writes share the same exclusive lock.
/// Clones share the same map.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    id_source: IdSource,
}

impl InMemorySessionStore {
    /// Creates an empty store drawing ids from the OS random source.
    pub fn new() -> Self {
        Self::with_id_source(generate_session_id)
    }

    /// Creates an empty store drawing ids from `id_source`.
    pub fn with_id_source(id_source: IdSource) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            id_source,
        }
    }

    // Every critical section is a single map operation, so a panic while
    // holding the lock cannot leave a half-written entry behind.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self) -> Result<String, SessionError> {
        let session_id = (self.id_source)()?;
        let session = Session::new(session_id.clone(), Utc::now());

        self.lock().insert(session_id.clone(), session);

        log::debug!(target: "visitor_session::store", "msg=\"session created\" session_prefix=\"{}\"", session_prefix(&session_id));
        Ok(session_id)
    }

    async fn get(&self, session_id: &str) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.lock();
        let session = sessions.get_mut(session_id)?;
        session.touch(now);
        Some(session.clone())
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn prune_idle(&self, max_idle: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.lock();

        let before_count = sessions.len();
        sessions.retain(|_, session| !session.is_idle(max_idle, now));

        before_count.saturating_sub(sessions.len())
    }

    async fn len(&self) -> usize {
        self.lock().len()
    }
}

/// First characters of an id, enough to correlate log lines without leaking it.
pub(crate) fn session_prefix(session_id: &str) -> String {
    session_id.chars().take(8).collect()
}
