use std::str::FromStr;
use std::time::Duration;

use crate::feed::{DEFAULT_UPDATE_INTERVAL, DEFAULT_VISIBLE_BIAS, FeedConfig};
use crate::highlight::DEFAULT_HIGHLIGHT_DURATION;

pub const DEFAULT_TOTAL_MATCHES: usize = 10_000;
pub const DEFAULT_ROW_HEIGHT: f32 = 80.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

/// Which applied updates start a flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightPolicy {
    /// Only rows inside the current visible range.
    #[default]
    VisibleOnly,
    Always,
}

impl HighlightPolicy {
    pub fn should_highlight(self, visible: bool) -> bool {
        match self {
            HighlightPolicy::VisibleOnly => visible,
            HighlightPolicy::Always => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub total_matches: usize,
    pub update_interval: Duration,
    pub highlight_duration: Duration,
    pub visible_bias: f64,
    pub row_height: f32,
    pub viewport_height: f32,
    pub highlight_policy: HighlightPolicy,
    pub seed: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            total_matches: env_or("ODDS_TOTAL_MATCHES", DEFAULT_TOTAL_MATCHES),
            update_interval: Duration::from_millis(env_or(
                "ODDS_UPDATE_INTERVAL_MS",
                DEFAULT_UPDATE_INTERVAL.as_millis() as u64,
            )),
            highlight_duration: Duration::from_millis(env_or(
                "ODDS_HIGHLIGHT_MS",
                DEFAULT_HIGHLIGHT_DURATION.as_millis() as u64,
            )),
            visible_bias: env_or("ODDS_VISIBLE_BIAS", DEFAULT_VISIBLE_BIAS),
            row_height: env_or("ODDS_ROW_HEIGHT", DEFAULT_ROW_HEIGHT),
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            highlight_policy: HighlightPolicy::default(),
            seed: std::env::var("ODDS_SEED").ok().and_then(|v| v.parse().ok()),
        }
    }
}

impl BoardConfig {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            interval: self.update_interval,
            visible_bias: self.visible_bias,
            seed: self.seed,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
