use gpui::{Div, MouseButton, MouseDownEvent, SharedString, Stateful, div, prelude::*, px, rgb};
use odds_core::{Direction, Price};

pub const IDLE_BG: u32 = 0x1f2937;
pub const SELECTED_BG: u32 = 0x2563eb;
pub const INCREASE_BG: u32 = 0x16a34a;
pub const DECREASE_BG: u32 = 0xdc2626;

const IDLE_BORDER: u32 = 0x374151;
const SELECTED_BORDER: u32 = 0x93c5fd;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OddsButtonState {
    pub selected: bool,
    pub flash: Option<Direction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: u32,
    pub hover_bg: u32,
    pub active_bg: u32,
    pub border: u32,
}

/// A flash colours the body; selection always keeps its outline.
pub fn palette(state: OddsButtonState) -> Palette {
    let bg = match (state.flash, state.selected) {
        (Some(Direction::Increase), _) => INCREASE_BG,
        (Some(Direction::Decrease), _) => DECREASE_BG,
        (None, true) => SELECTED_BG,
        (None, false) => IDLE_BG,
    };
    Palette {
        bg,
        hover_bg: tint(bg, 0.18),
        active_bg: shade(bg, 0.18),
        border: if state.selected {
            SELECTED_BORDER
        } else {
            IDLE_BORDER
        },
    }
}

pub fn odds_button(
    id: impl Into<SharedString>,
    label: &str,
    price: Price,
    state: OddsButtonState,
    handler: impl Fn(&MouseDownEvent, &mut gpui::Window, &mut gpui::App) + 'static,
) -> Stateful<Div> {
    let colors = palette(state);
    div()
        .flex()
        .flex_col()
        .items_center()
        .justify_center()
        .min_w(px(56.))
        .px_2()
        .py_1()
        .rounded_md()
        .bg(rgb(colors.bg))
        .border_1()
        .border_color(rgb(colors.border))
        .on_mouse_down(MouseButton::Left, handler)
        .child(
            div()
                .text_xs()
                .text_color(rgb(0x9ca3af))
                .child(label.to_string()),
        )
        .child(
            div()
                .text_sm()
                .text_color(gpui::white())
                .child(price.to_string()),
        )
        .id(id.into())
        .cursor_pointer()
        .hover(move |s| s.bg(rgb(colors.hover_bg)))
        .active(move |s| s.bg(rgb(colors.active_bg)))
}

fn channels(color: u32) -> [f32; 3] {
    [
        ((color >> 16) & 0xff) as f32,
        ((color >> 8) & 0xff) as f32,
        (color & 0xff) as f32,
    ]
}

fn pack([r, g, b]: [f32; 3]) -> u32 {
    let channel = |c: f32| c.round().clamp(0.0, 255.0) as u32;
    (channel(r) << 16) | (channel(g) << 8) | channel(b)
}

/// Blend toward white.
fn tint(color: u32, amount: f32) -> u32 {
    let amount = amount.clamp(0.0, 1.0);
    pack(channels(color).map(|c| c + (255.0 - c) * amount))
}

/// Blend toward black.
fn shade(color: u32, amount: f32) -> u32 {
    let amount = amount.clamp(0.0, 1.0);
    pack(channels(color).map(|c| c * (1.0 - amount)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_colours_win_over_selection() {
        let up = palette(OddsButtonState {
            selected: true,
            flash: Some(Direction::Increase),
        });
        assert_eq!(up.bg, INCREASE_BG);
        assert_eq!(up.border, SELECTED_BORDER);

        let down = palette(OddsButtonState {
            selected: false,
            flash: Some(Direction::Decrease),
        });
        assert_eq!(down.bg, DECREASE_BG);
        assert_eq!(down.border, IDLE_BORDER);

        assert_eq!(
            palette(OddsButtonState {
                selected: true,
                flash: None
            })
            .bg,
            SELECTED_BG
        );
        assert_eq!(palette(OddsButtonState::default()).bg, IDLE_BG);
    }

    #[test]
    fn hover_is_lighter_and_press_is_darker() {
        let colors = palette(OddsButtonState::default());
        let sum = |c: u32| channels(c).iter().sum::<f32>();
        assert!(sum(colors.hover_bg) > sum(colors.bg));
        assert!(sum(colors.active_bg) < sum(colors.bg));
        assert_eq!(tint(0x000000, 1.0), 0xffffff);
        assert_eq!(shade(0xffffff, 1.0), 0x000000);
        assert_eq!(tint(0x123456, 0.0), 0x123456);
    }
}
