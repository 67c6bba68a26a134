//! Background removal of idle sessions.

use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::SessionStore;

/// Periodically prunes sessions idle for longer than `max_idle`.
///
/// Run one per store; stop it by cancelling the token passed to [`spawn`](Self::spawn).
pub struct SessionSweeper<S> {
    store: S,
    max_idle: Duration,
    interval: Duration,
}

impl<S> SessionSweeper<S>
where
    S: SessionStore + 'static,
{
    pub fn new(store: S, max_idle: Duration, interval: Duration) -> Self {
        Self {
            store,
            max_idle,
            interval,
        }
    }

    /// Runs a single sweep and returns the number of sessions removed.
    pub async fn sweep_once(&self) -> usize {
        let pruned = self.store.prune_idle(self.max_idle).await;
        if pruned > 0 {
            log::info!(target: "visitor_session::sweeper", "msg=\"idle sessions pruned\" pruned={pruned}");
        }
        pruned
    }

    /// Starts sweeping every `interval` until `shutdown` is cancelled.
    ///
    /// Returns `None` without spawning when the interval is not positive.
    pub fn spawn(self, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
        let period = self.interval.to_std().ok().filter(|d| !d.is_zero())?;
        Some(tokio::spawn(self.run(period, shutdown)))
    }

    async fn run(self, period: StdDuration, shutdown: CancellationToken) {
        // First tick fires immediately; skip it so the first sweep waits a full period.
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(target: "visitor_session::sweeper", "msg=\"session sweeper started\" interval_secs={}", period.as_secs());

        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }

        log::info!(target: "visitor_session::sweeper", "msg=\"session sweeper stopped\"");
    }
}

/// Waits for a spawned sweeper to exit, logging it if the task panicked or was aborted.
pub async fn join_sweeper(handle: JoinHandle<()>) -> Result<(), JoinError> {
    handle.await.inspect_err(|e| {
        log::error!(target: "visitor_session::sweeper", "msg=\"session sweeper failed\" error=\"{e}\"");
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::session::InMemorySessionStore;

    #[tokio::test]
    async fn test_sweep_once_keeps_fresh_sessions() {
        let store = InMemorySessionStore::new();
        store.create().await.unwrap();
        store.create().await.unwrap();

        let sweeper = SessionSweeper::new(store.clone(), Duration::hours(1), Duration::minutes(5));

        assert_eq!(sweeper.sweep_once().await, 0);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_sweep_once_removes_idle_sessions() {
        let store = InMemorySessionStore::new();
        store.create().await.unwrap();

        // Everything created before this instant is idle under a zero limit.
        tokio::time::sleep(StdDuration::from_millis(5)).await;
        let sweeper = SessionSweeper::new(store.clone(), Duration::zero(), Duration::minutes(5));

        assert_eq!(sweeper.sweep_once().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_spawn_disabled_for_zero_interval() {
        let store = InMemorySessionStore::new();
        let sweeper = SessionSweeper::new(store, Duration::hours(1), Duration::zero());

        assert!(sweeper.spawn(CancellationToken::new()).is_none());
    }

    #[tokio::test]
    async fn test_spawned_sweeper_prunes_and_stops_on_cancel() {
        let store = InMemorySessionStore::new();
        store.create().await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(5)).await;

        let token = CancellationToken::new();
        let handle = SessionSweeper::new(store.clone(), Duration::zero(), Duration::milliseconds(20))
            .spawn(token.clone())
            .unwrap();

        let deadline = Utc::now() + Duration::seconds(5);
        while !store.is_empty().await && Utc::now() < deadline {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
        assert!(store.is_empty().await);

        token.cancel();
        tokio::time::timeout(StdDuration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_join_sweeper_clean_exit() {
        let token = CancellationToken::new();
        let handle = SessionSweeper::new(
            InMemorySessionStore::new(),
            Duration::hours(1),
            Duration::minutes(5),
        )
        .spawn(token.clone())
        .unwrap();

        token.cancel();
        assert!(join_sweeper(handle).await.is_ok());
    }

    #[tokio::test]
    async fn test_join_sweeper_reports_panic() {
        let handle = tokio::spawn(async {
            panic!("sweep exploded");
        });

        let err = join_sweeper(handle).await.unwrap_err();
        assert!(err.is_panic());
    }
}
