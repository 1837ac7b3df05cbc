use std::collections::HashMap;
use std::future::poll_fn;
use std::task::{Context, Poll};
use std::time::Duration;

use tokio_util::time::{DelayQueue, delay_queue};

use crate::types::{Direction, Highlights};

pub const DEFAULT_HIGHLIGHT_DURATION: Duration = Duration::from_millis(1_000);

struct Flash {
    direction: Direction,
    key: delay_queue::Key,
}

/// Transient price-change flags. Every id owns at most one pending expiry;
/// refreshing an id moves its deadline instead of queueing another one.
///
/// Timers are registered with the tokio time driver, so the manager must be
/// used from inside a runtime.
pub struct HighlightManager {
    duration: Duration,
    flashes: HashMap<String, Flash>,
    expiries: DelayQueue<String>,
}

impl HighlightManager {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            flashes: HashMap::new(),
            expiries: DelayQueue::new(),
        }
    }

    pub fn highlight(&mut self, option_id: &str, direction: Direction) {
        match self.flashes.get_mut(option_id) {
            Some(flash) => {
                flash.direction = direction;
                self.expiries.reset(&flash.key, self.duration);
            }
            None => {
                let key = self.expiries.insert(option_id.to_string(), self.duration);
                self.flashes
                    .insert(option_id.to_string(), Flash { direction, key });
            }
        }
    }

    pub fn direction(&self, option_id: &str) -> Option<Direction> {
        self.flashes.get(option_id).map(|f| f.direction)
    }

    pub fn snapshot(&self) -> Highlights {
        self.flashes
            .iter()
            .map(|(id, flash)| (id.clone(), flash.direction))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.flashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flashes.is_empty()
    }

    pub fn pending_timers(&self) -> usize {
        self.expiries.len()
    }

    /// Drop the next flash whose deadline passed and yield its id.
    /// `Ready(None)` means nothing is pending.
    pub fn poll_expired(&mut self, cx: &mut Context<'_>) -> Poll<Option<String>> {
        match self.expiries.poll_expired(cx) {
            Poll::Ready(Some(expired)) => {
                let option_id = expired.into_inner();
                self.flashes.remove(&option_id);
                Poll::Ready(Some(option_id))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    pub async fn next_expired(&mut self) -> Option<String> {
        poll_fn(|cx| self.poll_expired(cx)).await
    }

    /// Cancel every pending expiry.
    pub fn clear(&mut self) {
        self.expiries.clear();
        self.flashes.clear();
    }
}

impl Default for HighlightManager {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHT_DURATION)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::task::Waker;

    use super::*;

    /// Collect whatever has expired at the current (paused) instant.
    pub(crate) fn drain_expired(manager: &mut HighlightManager) -> Vec<String> {
        let mut cx = Context::from_waker(Waker::noop());
        let mut expired = Vec::new();
        while let Poll::Ready(Some(id)) = manager.poll_expired(&mut cx) {
            expired.push(id);
        }
        expired
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_keeps_one_entry_and_one_timer() {
        let mut manager = HighlightManager::default();
        manager.highlight("match-1-1X2-1", Direction::Increase);
        manager.highlight("match-1-1X2-1", Direction::Decrease);

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.pending_timers(), 1);
        assert_eq!(manager.direction("match-1-1X2-1"), Some(Direction::Decrease));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_duration() {
        let mut manager = HighlightManager::new(Duration::from_millis(1_000));
        manager.highlight("match-4-Total-Over 2.5", Direction::Increase);

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(drain_expired(&mut manager).is_empty());
        assert!(manager.direction("match-4-Total-Over 2.5").is_some());

        tokio::time::advance(Duration::from_millis(2)).await;
        assert_eq!(drain_expired(&mut manager), vec!["match-4-Total-Over 2.5"]);
        assert!(manager.is_empty());
        assert!(!manager.snapshot().contains_key("match-4-Total-Over 2.5"));
        assert_eq!(manager.pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_restarts_the_timer() {
        let mut manager = HighlightManager::new(Duration::from_millis(1_000));
        manager.highlight("a", Direction::Increase);
        tokio::time::advance(Duration::from_millis(600)).await;
        manager.highlight("a", Direction::Decrease);

        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(drain_expired(&mut manager).is_empty());
        assert_eq!(manager.direction("a"), Some(Direction::Decrease));

        tokio::time::advance(Duration::from_millis(401)).await;
        assert_eq!(drain_expired(&mut manager), vec!["a"]);
    }

    #[tokio::test(start_paused = true)]
    async fn next_expired_waits_for_the_deadline() {
        let mut manager = HighlightManager::new(Duration::from_millis(250));
        manager.highlight("b", Direction::Increase);
        let started = tokio::time::Instant::now();
        assert_eq!(manager.next_expired().await.as_deref(), Some("b"));
        assert!(started.elapsed() >= Duration::from_millis(250));
        assert_eq!(manager.next_expired().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cancels_pending_timers() {
        let mut manager = HighlightManager::default();
        manager.highlight("a", Direction::Increase);
        manager.highlight("b", Direction::Decrease);
        manager.clear();
        assert_eq!(manager.pending_timers(), 0);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(drain_expired(&mut manager).is_empty());
        assert!(manager.snapshot().is_empty());
    }
}
