use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use odds_core::{BoardConfig, BoardPhase, BoardSession, HighlightPolicy, ViewState};
use odds_ui::logging::init_logging;
use tracing::info;

/// Headless soak run: drives a board session with synthetic scrolling and
/// reports how the feed, highlights and drop counter behave.
#[derive(Parser, Debug)]
#[command(name = "odds-soak")]
struct Args {
    #[arg(long, default_value_t = 10_000)]
    matches: usize,

    #[arg(long, default_value_t = 10)]
    seconds: u64,

    #[arg(long, default_value_t = 25)]
    update_interval_ms: u64,

    /// Pixels scrolled per step; steps run every 100 ms.
    #[arg(long, default_value_t = 240.0)]
    scroll_step: f32,

    #[arg(long)]
    always_highlight: bool,

    #[arg(long, default_value_t = 7)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(soak(args))
}

async fn soak(args: Args) -> Result<()> {
    let config = BoardConfig {
        total_matches: args.matches,
        update_interval: Duration::from_millis(args.update_interval_ms),
        highlight_policy: if args.always_highlight {
            HighlightPolicy::Always
        } else {
            HighlightPolicy::VisibleOnly
        },
        seed: Some(args.seed),
        ..BoardConfig::default()
    };
    let row_height = config.row_height;
    let view_state = ViewState::in_memory().context("opening in-memory view state")?;
    let board = BoardSession::spawn(config, view_state, &tokio::runtime::Handle::current());

    let load_started = Instant::now();
    let mut snapshots = board.subscribe();
    snapshots
        .wait_for(|s| s.phase == BoardPhase::Ready)
        .await
        .context("board session ended before loading")?;
    info!(
        matches = args.matches,
        elapsed_ms = load_started.elapsed().as_millis() as u64,
        "board ready"
    );

    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    let mut ticker = tokio::time::interval(Duration::from_millis(100));
    let mut offset = 0.0f32;
    let mut direction = 1.0f32;
    let mut peak_highlights = 0usize;
    let mut step = 0u64;
    while Instant::now() < deadline {
        ticker.tick().await;
        step += 1;
        let snapshot = board.snapshot();
        let max_offset = snapshot.total_rows as f32 * row_height;
        offset += args.scroll_step * direction;
        if offset <= 0.0 || offset >= max_offset {
            direction = -direction;
            offset = offset.clamp(0.0, max_offset);
        }
        board.scroll_to(offset);
        if step % 5 == 0 {
            board.toggle_selection(format!(
                "match-{}-1X2-1",
                snapshot.visible_range.start
            ));
        }
        peak_highlights = peak_highlights.max(snapshot.highlights.len());
        if step % 10 == 0 {
            info!(
                offset = snapshot.scroll_offset,
                visible_start = snapshot.visible_range.start,
                visible_end = snapshot.visible_range.end,
                highlights = snapshot.highlights.len(),
                selected = snapshot.stats.selected,
                dropped = snapshot.stats.dropped_updates,
                "soak progress"
            );
        }
    }

    board.shutdown();
    let last = board.snapshot();
    board.join().await.context("board session panicked")?;
    info!(
        peak_highlights,
        selected = last.stats.selected,
        dropped = last.stats.dropped_updates,
        "soak finished"
    );
    Ok(())
}
