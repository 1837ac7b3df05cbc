use std::time::Duration;

use gpui::{Animation, AnimationExt, Div, ElementId, div, prelude::*, px, rgb};

/// Placeholder bar that fades in and out while a row or the board is loading.
pub fn loading_pulse(id: impl Into<ElementId>, width: f32, height: f32) -> impl IntoElement {
    let animation = Animation::new(Duration::from_millis(1_200)).repeat();

    div()
        .w(px(width))
        .h(px(height))
        .rounded_md()
        .bg(rgb(0x1f2937))
        .with_animation(id.into(), animation, move |this: Div, delta| {
            this.opacity(pulse_opacity(delta.clamp(0.0, 1.0)))
        })
}

/// Triangle wave between 0.35 and 1.0.
fn pulse_opacity(delta: f32) -> f32 {
    let wave = if delta < 0.5 {
        1.0 - delta / 0.5
    } else {
        (delta - 0.5) / 0.5
    };
    0.35 + 0.65 * wave
}
