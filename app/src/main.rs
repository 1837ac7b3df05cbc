use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use odds_core::BoardConfig;
use tracing::info;

mod input;
use input::{HighlightArg, StorageArg};

#[derive(Parser, Debug)]
#[command(name = "odds-board")]
struct Args {
    /// Number of matches to generate.
    #[arg(long)]
    matches: Option<usize>,

    /// Milliseconds between simulated price updates.
    #[arg(long)]
    update_interval_ms: Option<u64>,

    /// How long a changed price stays highlighted, in milliseconds.
    #[arg(long)]
    highlight_ms: Option<u64>,

    /// Share of updates aimed at rows currently on screen (0.0 - 1.0).
    #[arg(long, value_parser = parse_bias)]
    visible_bias: Option<f64>,

    #[arg(long, value_enum, default_value = "visible")]
    highlight_policy: HighlightArg,

    /// Where the scroll position and selection are kept.
    #[arg(long, value_enum, default_value = "both")]
    storage: StorageArg,

    /// DuckDB file for persisted view state.
    #[arg(long)]
    state_path: Option<PathBuf>,

    /// Seed for deterministic match generation and updates.
    #[arg(long)]
    seed: Option<u64>,

    /// Forget the saved scroll position and selection before starting.
    #[arg(long)]
    reset_view: bool,
}

impl Args {
    fn board_config(&self) -> BoardConfig {
        let mut config = BoardConfig::default();
        if let Some(matches) = self.matches {
            config.total_matches = matches;
        }
        if let Some(ms) = self.update_interval_ms {
            config.update_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.highlight_ms {
            config.highlight_duration = Duration::from_millis(ms);
        }
        if let Some(bias) = self.visible_bias {
            config.visible_bias = bias;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.highlight_policy = self.highlight_policy.into();
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = odds_ui::logging::init_logging() {
        info!(log = %path.display(), "logging to file");
    }

    let config = args.board_config();
    let mut view_state = odds_ui::store::open_view_state(args.state_path.clone(), args.storage.into())
        .context("failed to open view state store")?;
    if args.reset_view {
        view_state
            .reset()
            .context("failed to reset persisted view state")?;
    }

    info!(
        matches = config.total_matches,
        update_interval_ms = config.update_interval.as_millis() as u64,
        highlight_ms = config.highlight_duration.as_millis() as u64,
        policy = ?config.highlight_policy,
        "starting live odds board"
    );
    odds_ui::launch_board(config, view_state);
    Ok(())
}

fn parse_bias(raw: &str) -> Result<f64, String> {
    let bias: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid bias: {raw}"))?;
    if !(0.0..=1.0).contains(&bias) {
        return Err(format!("bias must be within 0.0 and 1.0, got {bias}"));
    }
    Ok(bias)
}
