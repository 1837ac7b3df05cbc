use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use time::OffsetDateTime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::types::{CATEGORIES, UpdateEvent, VisibleRange};

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(2_000);
pub const DEFAULT_VISIBLE_BIAS: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub interval: Duration,
    /// Probability that a tick targets the visible range.
    pub visible_bias: f64,
    pub seed: Option<u64>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_UPDATE_INTERVAL,
            visible_bias: DEFAULT_VISIBLE_BIAS,
            seed: None,
        }
    }
}

pub type SubscriberId = u64;

pub struct FeedSubscription {
    pub id: SubscriberId,
    pub receiver: UnboundedReceiver<UpdateEvent>,
}

struct FeedState {
    running: bool,
    generation: u64,
    ticks: u64,
    task: Option<JoinHandle<()>>,
    next_subscriber: SubscriberId,
    subscribers: Vec<(SubscriberId, UnboundedSender<UpdateEvent>)>,
    visible_range: VisibleRange,
    /// Shared across restarts so a seeded feed continues its sequence.
    rng: StdRng,
}

struct FeedInner {
    config: FeedConfig,
    match_count: usize,
    state: Mutex<FeedState>,
}

/// Simulated price source. Emits update descriptors on a fixed period to every
/// subscriber, favouring rows inside the last reported visible range.
///
/// Emission happens under the state lock and is tagged with the generation the
/// ticking task was started with, so once `stop` returns no further event is
/// delivered, even if the aborted task was mid-tick. Dropping the feed stops it.
pub struct UpdateFeed {
    inner: Arc<FeedInner>,
}

impl UpdateFeed {
    pub fn new(config: FeedConfig, match_count: usize) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            inner: Arc::new(FeedInner {
                config,
                match_count,
                state: Mutex::new(FeedState {
                    running: false,
                    generation: 0,
                    ticks: 0,
                    task: None,
                    next_subscriber: 0,
                    subscribers: Vec::new(),
                    visible_range: VisibleRange::EMPTY,
                    rng,
                }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.inner.state()
    }

    /// Spawn the ticking task on the current tokio runtime. Returns `false`
    /// when the feed is already running.
    pub fn start(&self) -> bool {
        let mut state = self.state();
        if state.running {
            return false;
        }
        state.running = true;
        state.generation += 1;
        let generation = state.generation;
        let inner = Arc::clone(&self.inner);
        state.task = Some(tokio::spawn(run_ticks(inner, generation)));
        info!(
            interval_ms = self.inner.config.interval.as_millis() as u64,
            matches = self.inner.match_count,
            "update feed started"
        );
        true
    }

    /// Stop ticking. Returns `false` when the feed was not running.
    pub fn stop(&self) -> bool {
        let mut state = self.state();
        if !state.running {
            return false;
        }
        state.running = false;
        state.generation += 1;
        if let Some(task) = state.task.take() {
            task.abort();
        }
        info!(ticks = state.ticks, "update feed stopped");
        true
    }

    pub fn is_running(&self) -> bool {
        self.state().running
    }

    pub fn subscribe(&self) -> FeedSubscription {
        let (sender, receiver) = unbounded_channel();
        let mut state = self.state();
        let id = state.next_subscriber;
        state.next_subscriber += 1;
        state.subscribers.push((id, sender));
        FeedSubscription { id, receiver }
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut state = self.state();
        let before = state.subscribers.len();
        state.subscribers.retain(|(sid, _)| *sid != id);
        state.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.state().subscribers.len()
    }

    pub fn set_visible_range(&self, range: VisibleRange) {
        self.state().visible_range = range;
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.state().visible_range
    }

    #[cfg(test)]
    fn ticks(&self) -> u64 {
        self.state().ticks
    }
}

impl Drop for UpdateFeed {
    fn drop(&mut self) {
        self.stop();
        self.state().subscribers.clear();
    }
}

impl FeedInner {
    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Emit one event if `generation` is still current.
    fn emit(&self, generation: u64) -> bool {
        let mut guard = self.state();
        let state = &mut *guard;
        if !state.running || state.generation != generation {
            return false;
        }
        state.ticks += 1;
        let Some(event) = next_event(
            &mut state.rng,
            self.match_count,
            state.visible_range,
            self.config.visible_bias,
        ) else {
            return true;
        };
        debug!(
            match_index = event.match_index,
            category = %event.category,
            option_index = event.option_index,
            "feed tick"
        );
        state
            .subscribers
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
        true
    }
}

async fn run_ticks(inner: Arc<FeedInner>, generation: u64) {
    let mut ticker = interval(inner.config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // the first tick completes immediately
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if !inner.emit(generation) {
            break;
        }
    }
}

/// Pick the next update target. With probability `visible_bias` the match is
/// drawn from `visible` (clipped to the store), otherwise from all matches.
pub fn next_event<R: Rng + ?Sized>(
    rng: &mut R,
    match_count: usize,
    visible: VisibleRange,
    visible_bias: f64,
) -> Option<UpdateEvent> {
    if match_count == 0 {
        return None;
    }
    let window = visible.indices(match_count);
    let bias = if visible_bias.is_finite() {
        visible_bias.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let match_index = if !window.is_empty() && rng.gen_bool(bias) {
        rng.gen_range(window)
    } else {
        rng.gen_range(0..match_count)
    };
    let category = CATEGORIES[rng.gen_range(0..CATEGORIES.len())];
    let option_index = rng.gen_range(0..category.options.len());
    Some(UpdateEvent {
        match_index,
        category: category.name.to_string(),
        option_index,
        timestamp: OffsetDateTime::now_utc(),
    })
}
