use gpui::{Div, SharedString, div, prelude::*, rgb};
use odds_core::{BoardPhase, BoardSnapshot};

fn stat_chip(label: &str, value: impl Into<SharedString>, accent: u32) -> Div {
    div()
        .flex()
        .items_center()
        .gap_2()
        .px_3()
        .py_2()
        .rounded_md()
        .bg(rgb(0x111827))
        .border_1()
        .border_color(rgb(0x1f2937))
        .child(
            div()
                .text_xs()
                .text_color(rgb(0x9ca3af))
                .child(label.to_string()),
        )
        .child(div().text_sm().text_color(rgb(accent)).child(value.into()))
}

pub fn stats_header(snapshot: &BoardSnapshot) -> Div {
    let stats = snapshot.stats;
    let status = match snapshot.phase {
        BoardPhase::Loading => "loading",
        BoardPhase::Ready => "live feed",
    };
    div()
        .flex()
        .justify_between()
        .items_center()
        .p_3()
        .bg(rgb(0x111827))
        .border_b_1()
        .border_color(rgb(0x1f2937))
        .child(
            div()
                .flex()
                .items_center()
                .gap_3()
                .child(div().text_sm().child("Live Odds Board"))
                .child(div().text_xs().text_color(rgb(0x9ca3af)).child(status)),
        )
        .child(
            div()
                .flex()
                .gap_3()
                .child(stat_chip("Total", stats.total.to_string(), 0xe5e7eb))
                .child(stat_chip("Live", stats.live.to_string(), 0xef4444))
                .child(stat_chip("Selected", stats.selected.to_string(), 0x60a5fa))
                .child(stat_chip(
                    "Dropped",
                    stats.dropped_updates.to_string(),
                    0x9ca3af,
                )),
        )
}
