use crate::types::VisibleRange;

/// Rows rendered past the bottom of the viewport.
pub const OVERSCAN: usize = 10;

fn non_negative(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

fn valid_row_height(row_height: f32) -> Option<f32> {
    (row_height.is_finite() && row_height > 0.0).then_some(row_height)
}

/// Map a scroll position to the inclusive window of rows that must exist.
pub fn compute_visible_range(
    scroll_offset: f32,
    viewport_height: f32,
    row_height: f32,
    total_rows: usize,
) -> VisibleRange {
    if total_rows == 0 {
        return VisibleRange::EMPTY;
    }
    let last = total_rows - 1;
    let (start, visible_count) = match valid_row_height(row_height) {
        Some(row_height) => {
            let start = (non_negative(scroll_offset) / row_height).floor() as usize;
            let visible_count = (non_negative(viewport_height) / row_height).ceil() as usize;
            (start.min(last), visible_count)
        }
        None => (0, 0),
    };
    let end = start
        .saturating_add(visible_count)
        .saturating_add(OVERSCAN)
        .min(last);
    VisibleRange { start, end }
}

pub fn content_height(total_rows: usize, row_height: f32) -> f32 {
    valid_row_height(row_height).map_or(0.0, |h| total_rows as f32 * h)
}

pub fn max_scroll_offset(total_rows: usize, row_height: f32, viewport_height: f32) -> f32 {
    (content_height(total_rows, row_height) - non_negative(viewport_height)).max(0.0)
}

pub fn clamp_scroll_offset(
    offset: f32,
    total_rows: usize,
    row_height: f32,
    viewport_height: f32,
) -> f32 {
    non_negative(offset).min(max_scroll_offset(total_rows, row_height, viewport_height))
}

pub fn row_top(index: usize, row_height: f32) -> f32 {
    index as f32 * valid_row_height(row_height).unwrap_or(0.0)
}
