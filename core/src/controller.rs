use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::highlight::HighlightManager;
use crate::matches::MatchStore;
use crate::types::{AppliedUpdate, BoardStats, Highlights, Match, UpdateEvent, VisibleRange};
use crate::view_state::ViewState;
use crate::windowing::{clamp_scroll_offset, compute_visible_range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    Loading,
    Ready,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub phase: BoardPhase,
    pub scroll_offset: f32,
    pub row_height: f32,
    pub total_rows: usize,
    pub visible_range: VisibleRange,
    /// Rows of `visible_range`, starting at `visible_range.start`.
    pub visible_matches: Vec<Match>,
    pub highlights: Highlights,
    pub selected: BTreeSet<String>,
    pub stats: BoardStats,
}

impl BoardSnapshot {
    pub fn loading(config: &BoardConfig, scroll_offset: f32) -> Self {
        Self {
            phase: BoardPhase::Loading,
            scroll_offset,
            row_height: config.row_height,
            total_rows: 0,
            visible_range: VisibleRange::EMPTY,
            visible_matches: Vec::new(),
            highlights: Highlights::new(),
            selected: BTreeSet::new(),
            stats: BoardStats::default(),
        }
    }

    /// The row at absolute `index`, if this snapshot carries it.
    pub fn row(&self, index: usize) -> Option<&Match> {
        if self.visible_matches.is_empty() || !self.visible_range.contains(index) {
            return None;
        }
        self.visible_matches.get(index - self.visible_range.start)
    }
}

/// Board state machine: owns the matches, the highlight flags and the
/// persisted view state, and keeps the visible range in step with scrolling.
pub struct BoardController {
    config: BoardConfig,
    store: Option<MatchStore>,
    highlights: HighlightManager,
    view_state: ViewState,
    viewport_height: f32,
    visible_range: VisibleRange,
    dropped_updates: u64,
}

impl BoardController {
    pub fn new(config: BoardConfig, view_state: ViewState) -> Self {
        let highlights = HighlightManager::new(config.highlight_duration);
        let viewport_height = config.viewport_height;
        Self {
            config,
            store: None,
            highlights,
            view_state,
            viewport_height,
            visible_range: VisibleRange::EMPTY,
            dropped_updates: 0,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn phase(&self) -> BoardPhase {
        if self.store.is_some() {
            BoardPhase::Ready
        } else {
            BoardPhase::Loading
        }
    }

    pub fn load(&mut self, matches: Vec<Match>) -> Result<(), BoardError> {
        let store = MatchStore::new(matches)?;
        info!(
            matches = store.len(),
            live = store.live_count(),
            "board loaded"
        );
        match self
            .view_state
            .retain_selected(|id| store.resolve(id).is_some())
        {
            Ok(0) => {}
            Ok(dropped) => info!(dropped, "dropped selections no match carries"),
            Err(err) => warn!(%err, "failed to persist pruned selection"),
        }
        self.store = Some(store);
        let restored = self.view_state.scroll_offset();
        self.on_scroll(restored);
        Ok(())
    }

    pub fn match_count(&self) -> usize {
        self.store.as_ref().map_or(0, MatchStore::len)
    }

    pub fn scroll_offset(&self) -> f32 {
        self.view_state.scroll_offset()
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.visible_range
    }

    pub fn set_viewport_height(&mut self, viewport_height: f32) {
        if !viewport_height.is_finite() || viewport_height < 0.0 {
            return;
        }
        self.viewport_height = viewport_height;
        let offset = self.view_state.scroll_offset();
        self.on_scroll(offset);
    }

    /// Record a new scroll position and return the resulting visible range.
    /// While loading the offset is kept as given; it is clamped on load.
    pub fn on_scroll(&mut self, offset: f32) -> VisibleRange {
        let total = self.match_count();
        let offset = match self.store {
            Some(_) => clamp_scroll_offset(offset, total, self.config.row_height, self.viewport_height),
            None if offset.is_finite() => offset.max(0.0),
            None => 0.0,
        };
        if let Err(err) = self.view_state.set_scroll_offset(offset) {
            warn!(%err, "failed to persist scroll offset");
        }
        self.visible_range =
            compute_visible_range(offset, self.viewport_height, self.config.row_height, total);
        self.visible_range
    }

    /// Flip selection of `option_id` and return whether it is now selected.
    /// Ids that no match carries are ignored once the board is ready; ids
    /// queued while loading are checked when the matches arrive.
    pub fn toggle_selection(&mut self, option_id: &str) -> Option<bool> {
        if self
            .store
            .as_ref()
            .is_some_and(|store| store.resolve(option_id).is_none())
        {
            debug!(option_id, "ignoring selection of unknown option");
            return None;
        }
        match self.view_state.toggle_selected(option_id) {
            Ok(selected) => Some(selected),
            Err(err) => {
                warn!(option_id, %err, "failed to persist selection");
                Some(self.view_state.is_selected(option_id))
            }
        }
    }

    pub fn is_selected(&self, option_id: &str) -> bool {
        self.view_state.is_selected(option_id)
    }

    /// Apply one feed descriptor with the relative price `change`.
    pub fn apply_event(&mut self, event: &UpdateEvent, change: f64) -> Option<AppliedUpdate> {
        let Some(store) = self.store.as_mut() else {
            self.dropped_updates += 1;
            debug!(match_index = event.match_index, "update dropped while loading");
            return None;
        };
        let Some(applied) =
            store.apply_update(event.match_index, &event.category, event.option_index, change)
        else {
            self.dropped_updates += 1;
            debug!(
                match_index = event.match_index,
                category = %event.category,
                option_index = event.option_index,
                "update references no option"
            );
            return None;
        };
        let visible = self.visible_range.contains(applied.match_index);
        if self.config.highlight_policy.should_highlight(visible) {
            self.highlights
                .highlight(&applied.option_id, applied.direction);
        }
        Some(applied)
    }

    pub fn has_highlights(&self) -> bool {
        !self.highlights.is_empty()
    }

    pub fn highlights(&self) -> &HighlightManager {
        &self.highlights
    }

    /// Wait for the next highlight to lapse and return its option id.
    pub async fn next_expired(&mut self) -> Option<String> {
        self.highlights.next_expired().await
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats {
            total: self.match_count(),
            live: self.store.as_ref().map_or(0, MatchStore::live_count),
            selected: self.view_state.selected_option_ids().len(),
            dropped_updates: self.dropped_updates,
        }
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let Some(store) = &self.store else {
            let mut snapshot = BoardSnapshot::loading(&self.config, self.scroll_offset());
            snapshot.selected = self.view_state.selected_option_ids().clone();
            snapshot.stats = self.stats();
            return snapshot;
        };
        BoardSnapshot {
            phase: BoardPhase::Ready,
            scroll_offset: self.scroll_offset(),
            row_height: self.config.row_height,
            total_rows: store.len(),
            visible_range: self.visible_range,
            visible_matches: store.rows(self.visible_range).to_vec(),
            highlights: self.highlights.snapshot(),
            selected: self.view_state.selected_option_ids().clone(),
            stats: self.stats(),
        }
    }

    /// Cancel every pending highlight.
    pub fn teardown(&mut self) {
        self.highlights.clear();
    }
}
