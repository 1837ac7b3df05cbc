use gpui::{Context, Div, ElementId, MouseDownEvent, SharedString, div, prelude::*, px, rgb};
use odds_core::{BoardSnapshot, Match};

use super::view::BoardView;
use crate::components::loading_pulse::loading_pulse;
use crate::components::odds_button::{OddsButtonState, odds_button};

fn row_shell() -> Div {
    div()
        .flex()
        .items_center()
        .gap_4()
        .size_full()
        .px_3()
        .rounded_md()
        .bg(rgb(0x0f172a))
        .border_1()
        .border_color(rgb(0x1f2937))
}

fn pulse_id(index: usize, part: &str) -> ElementId {
    ElementId::Name(format!("skeleton-{index}-{part}").into())
}

pub fn skeleton_row(index: usize) -> Div {
    row_shell()
        .child(
            div()
                .flex()
                .flex_col()
                .gap_2()
                .w(px(260.))
                .child(loading_pulse(pulse_id(index, "title"), 180.0, 10.0))
                .child(loading_pulse(pulse_id(index, "meta"), 120.0, 10.0)),
        )
        .child(loading_pulse(pulse_id(index, "odds"), 520.0, 36.0))
}

pub fn match_row(
    index: usize,
    m: &Match,
    snapshot: &BoardSnapshot,
    cx: &mut Context<BoardView>,
) -> Div {
    let sport = m.sport.config();
    let mut status = div()
        .flex()
        .items_center()
        .gap_2()
        .text_xs()
        .text_color(rgb(0x9ca3af))
        .child(m.start_time.clone());
    if m.is_live {
        status = status
            .child(
                div()
                    .px_1()
                    .rounded_md()
                    .bg(rgb(0xdc2626))
                    .text_color(gpui::white())
                    .child("LIVE"),
            )
            .child(div().text_color(gpui::white()).child(m.score.clone()));
    }

    let summary = div()
        .flex()
        .flex_col()
        .gap_1()
        .w(px(280.))
        .min_w(px(0.))
        .child(
            div()
                .flex()
                .items_center()
                .gap_2()
                .text_xs()
                .child(div().text_color(rgb(sport.color)).child(sport.icon))
                .child(
                    div()
                        .text_color(rgb(0x9ca3af))
                        .child(format!("{} · {}", sport.name, m.league)),
                ),
        )
        .child(
            div()
                .text_sm()
                .child(format!("{} vs {}", m.team1, m.team2)),
        )
        .child(status);

    let mut markets = div().flex().items_center().gap_4();
    for category in &m.betting_options {
        let mut buttons = div().flex().gap_1();
        for option in &category.options {
            let state = OddsButtonState {
                selected: snapshot.selected.contains(&option.id),
                flash: snapshot.highlights.get(&option.id).copied(),
            };
            let option_id = option.id.clone();
            let handler = cx.listener(
                move |this: &mut BoardView, _: &MouseDownEvent, window, _| {
                    this.toggle_selection(&option_id);
                    window.refresh();
                },
            );
            let button_id = SharedString::from(format!("odds-{}", option.id));
            buttons = buttons.child(odds_button(
                button_id,
                &option.name,
                option.value,
                state,
                handler,
            ));
        }
        markets = markets.child(
            div()
                .flex()
                .flex_col()
                .gap_1()
                .child(
                    div()
                        .text_xs()
                        .text_color(rgb(0x6b7280))
                        .child(category.name.clone()),
                )
                .child(buttons),
        );
    }

    row_shell()
        .child(
            div()
                .w(px(48.))
                .text_xs()
                .text_color(rgb(0x4b5563))
                .child(format!("#{}", index + 1)),
        )
        .child(summary)
        .child(markets)
}
