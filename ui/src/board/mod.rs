use gpui::{
    App, Application, Bounds, TitlebarOptions, WindowBounds, WindowOptions, prelude::*, px, size,
};
use odds_core::{BoardConfig, ViewState};
use tracing::error;

mod header;
mod row;
mod view;

pub use view::BoardView;

use crate::live::start_board;

pub fn launch_board(config: BoardConfig, view_state: ViewState) {
    let row_height = config.row_height;
    let handle = start_board(config, view_state);
    Application::new().run(move |cx: &mut App| {
        let bounds = Bounds::centered(None, size(px(1280.), px(860.)), cx);
        let opened = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                titlebar: Some(TitlebarOptions {
                    title: Some("Live Odds Board".into()),
                    ..Default::default()
                }),
                focus: true,
                ..Default::default()
            },
            move |window, cx| {
                let view = cx.new(|_| BoardView::new(handle, row_height));
                view::start_snapshot_pump(window, cx, view.clone());
                view
            },
        );
        if let Err(err) = opened {
            error!(%err, "failed to open board window");
            cx.quit();
            return;
        }
        cx.activate(true);
    });
}
