use std::sync::Arc;
use std::time::Duration;

use gpui::{
    App, Bounds, Context, Entity, Pixels, Render, ScrollWheelEvent, Window, div, prelude::*, px,
    rgb,
};
use odds_core::windowing::{clamp_scroll_offset, compute_visible_range, row_top};
use odds_core::{BoardHandle, BoardPhase, BoardSnapshot, VisibleRange};
use tokio::sync::watch;
use tracing::debug;

use super::header::stats_header;
use super::row::{match_row, skeleton_row};
use crate::components::loading_pulse::loading_pulse;

const SNAPSHOT_PUMP_INTERVAL: Duration = Duration::from_millis(33);

/// Scroll position kept on the UI side so the list moves without waiting
/// for the session to answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LocalViewport {
    pub scroll_offset: f32,
    pub viewport_height: f32,
    pub row_height: f32,
}

impl LocalViewport {
    pub fn new(row_height: f32) -> Self {
        Self {
            scroll_offset: 0.0,
            viewport_height: 0.0,
            row_height,
        }
    }

    /// Move by `delta` pixels. Returns the new offset if it changed.
    pub fn scroll_by(&mut self, delta: f32, total_rows: usize) -> Option<f32> {
        let next = clamp_scroll_offset(
            self.scroll_offset + delta,
            total_rows,
            self.row_height,
            self.viewport_height,
        );
        if (next - self.scroll_offset).abs() < f32::EPSILON {
            return None;
        }
        self.scroll_offset = next;
        Some(next)
    }

    /// Returns `true` when the height actually changed.
    pub fn resize(&mut self, viewport_height: f32, total_rows: usize) -> bool {
        if (viewport_height - self.viewport_height).abs() < 0.5 {
            return false;
        }
        self.viewport_height = viewport_height;
        self.scroll_offset = clamp_scroll_offset(
            self.scroll_offset,
            total_rows,
            self.row_height,
            viewport_height,
        );
        true
    }

    pub fn visible_range(&self, total_rows: usize) -> VisibleRange {
        compute_visible_range(
            self.scroll_offset,
            self.viewport_height,
            self.row_height,
            total_rows,
        )
    }
}

pub struct BoardView {
    board: BoardHandle,
    snapshots: watch::Receiver<Arc<BoardSnapshot>>,
    snapshot: Arc<BoardSnapshot>,
    viewport: LocalViewport,
    restored: bool,
}

impl BoardView {
    pub fn new(board: BoardHandle, row_height: f32) -> Self {
        let mut snapshots = board.subscribe();
        let snapshot = snapshots.borrow_and_update().clone();
        Self {
            board,
            snapshots,
            snapshot,
            viewport: LocalViewport::new(row_height),
            restored: false,
        }
    }

    /// Adopt the latest published snapshot. Returns `true` if there was one.
    pub fn pull_snapshot(&mut self) -> bool {
        if !self.snapshots.has_changed().unwrap_or(false) {
            return false;
        }
        self.snapshot = self.snapshots.borrow_and_update().clone();
        if !self.restored && self.snapshot.phase == BoardPhase::Ready {
            self.restored = true;
            self.viewport.scroll_offset = self.snapshot.scroll_offset;
            debug!(
                scroll_offset = self.viewport.scroll_offset,
                "restored board scroll position"
            );
        }
        true
    }

    fn scroll_by(&mut self, delta: f32) -> bool {
        match self.viewport.scroll_by(delta, self.snapshot.total_rows) {
            Some(offset) => {
                self.board.scroll_to(offset);
                true
            }
            None => false,
        }
    }

    fn on_list_bounds(&mut self, bounds: Bounds<Pixels>) -> bool {
        let height = f32::from(bounds.size.height);
        if !self.viewport.resize(height, self.snapshot.total_rows) {
            return false;
        }
        self.board.resize(height);
        true
    }

    pub(super) fn toggle_selection(&mut self, option_id: &str) {
        self.board.toggle_selection(option_id);
    }
}

impl Render for BoardView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let snapshot = self.snapshot.clone();

        let track_bounds = cx.processor(
            |this: &mut Self, bounds: Vec<Bounds<Pixels>>, window: &mut Window, _| {
                if let Some(list) = bounds.get(1) {
                    if this.on_list_bounds(*list) {
                        window.refresh();
                    }
                }
            },
        );

        let handle_scroll = cx.listener(|this: &mut Self, event: &ScrollWheelEvent, window, _| {
            let delta = event.delta.pixel_delta(px(16.0));
            let scroll_y = f32::from(delta.y);
            if scroll_y.abs() < f32::EPSILON {
                return;
            }
            if this.scroll_by(-scroll_y) {
                window.refresh();
            }
        });

        let mut list = div()
            .relative()
            .flex_1()
            .w_full()
            .overflow_hidden()
            .bg(rgb(0x0b1220))
            .on_scroll_wheel(handle_scroll);

        if snapshot.phase == BoardPhase::Loading {
            list = list.child(
                div()
                    .size_full()
                    .flex()
                    .flex_col()
                    .items_center()
                    .justify_center()
                    .gap_3()
                    .child(loading_pulse("board-loading-wide", 320.0, 12.0))
                    .child(loading_pulse("board-loading-narrow", 240.0, 12.0))
                    .child(
                        div()
                            .text_sm()
                            .text_color(rgb(0x9ca3af))
                            .child("Loading matches..."),
                    ),
            );
        } else {
            let row_height = self.viewport.row_height;
            let range = self.viewport.visible_range(snapshot.total_rows);
            for index in range.indices(snapshot.total_rows) {
                let top = row_top(index, row_height) - self.viewport.scroll_offset;
                let row = match snapshot.row(index) {
                    Some(m) => match_row(index, m, &snapshot, cx),
                    None => skeleton_row(index),
                };
                list = list.child(
                    div()
                        .absolute()
                        .top(px(top))
                        .left(px(0.))
                        .w_full()
                        .h(px(row_height))
                        .px_3()
                        .py_1()
                        .child(row),
                );
            }
        }

        div()
            .flex()
            .flex_col()
            .size_full()
            .bg(rgb(0x0b1220))
            .text_color(gpui::white())
            .child(stats_header(&snapshot))
            .child(list)
            .on_children_prepainted(track_bounds)
    }
}

/// Poll the session for new snapshots and repaint only when one arrived.
pub(super) fn start_snapshot_pump(window: &mut Window, cx: &mut App, view: Entity<BoardView>) {
    window
        .spawn(cx, async move |async_cx| {
            loop {
                async_cx
                    .background_executor()
                    .timer(SNAPSHOT_PUMP_INTERVAL)
                    .await;
                let alive = async_cx
                    .update(|window, app| {
                        if view.update(app, |view, _| view.pull_snapshot()) {
                            window.refresh();
                        }
                    })
                    .is_ok();
                if !alive {
                    break;
                }
            }
        })
        .detach();
}
