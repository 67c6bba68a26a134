mod config;
mod cookie;
mod memory_store;
mod negotiator;
mod repository;
mod sweeper;

use chrono::{DateTime, Utc};
pub use config::{SameSite, SessionConfig};
pub use cookie::{SessionCookie, find_session_cookie};
pub use memory_store::InMemorySessionStore;
pub use negotiator::{Negotiated, NegotiationOutcome, SessionNegotiator};
pub use repository::SessionStore;
pub use sweeper::{SessionSweeper, join_sweeper};

/// A visitor's continuity token.
///
/// `id` never changes after creation. `last_accessed` only moves forward
/// and is never earlier than `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            last_accessed: now,
        }
    }

    /// Records an access at `now`, ignoring clock steps backwards.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }

    /// Returns true if the session has not been accessed within `max_idle` of `now`.
    pub fn is_idle(&self, max_idle: chrono::Duration, now: DateTime<Utc>) -> bool {
        now - self.last_accessed > max_idle
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_new_session_timestamps() {
        let now = Utc::now();
        let session = Session::new("session123".to_owned(), now);
        assert_eq!(session.created_at, now);
        assert_eq!(session.last_accessed, now);
    }

    #[test]
    fn test_touch_moves_forward() {
        let now = Utc::now();
        let mut session = Session::new("session123".to_owned(), now);

        session.touch(now + Duration::seconds(5));
        assert_eq!(session.last_accessed, now + Duration::seconds(5));
    }

    #[test]
    fn test_touch_ignores_earlier_clock() {
        let now = Utc::now();
        let mut session = Session::new("session123".to_owned(), now);

        session.touch(now - Duration::seconds(5));
        assert_eq!(session.last_accessed, now);
    }

    #[test]
    fn test_session_idle() {
        let now = Utc::now();
        let session = Session::new("session123".to_owned(), now - Duration::hours(3));

        assert!(session.is_idle(Duration::hours(1), now));
        assert!(!session.is_idle(Duration::hours(4), now));
    }
}
