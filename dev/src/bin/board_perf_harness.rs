use std::time::Duration;

use clap::{Parser, ValueEnum};
use odds_core::{BoardConfig, HighlightPolicy, ViewState};
use odds_ui::launch_board;
use odds_ui::logging::init_logging;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    #[value(name = "50k", alias = "small")]
    Small,
    #[value(name = "200k", alias = "medium")]
    Medium,
    #[value(name = "1m", alias = "large")]
    Large,
}

impl Preset {
    fn matches(self) -> usize {
        match self {
            Preset::Small => 50_000,
            Preset::Medium => 200_000,
            Preset::Large => 1_000_000,
        }
    }
}

/// Opens the board over a large generated data set.
#[derive(Parser, Debug)]
#[command(name = "board-perf-harness")]
struct Args {
    /// Named board size; overrides `--n`.
    #[arg(long, value_enum)]
    preset: Option<Preset>,

    #[arg(long, default_value_t = 200_000)]
    n: usize,

    #[arg(long, default_value_t = 50)]
    interval_ms: u64,

    /// Highlight updates to rows outside the viewport too.
    #[arg(long)]
    always: bool,

    #[arg(long, default_value_t = 0x0dd5)]
    seed: u64,
}

impl Args {
    fn board_config(&self) -> BoardConfig {
        BoardConfig {
            total_matches: self.preset.map_or(self.n, Preset::matches),
            update_interval: Duration::from_millis(self.interval_ms),
            highlight_policy: if self.always {
                HighlightPolicy::Always
            } else {
                HighlightPolicy::VisibleOnly
            },
            seed: Some(self.seed),
            ..BoardConfig::default()
        }
    }
}

fn main() {
    let args = Args::parse();
    init_logging();

    let view_state = match ViewState::in_memory() {
        Ok(view_state) => view_state,
        Err(err) => {
            eprintln!("failed to open in-memory view state: {err}");
            std::process::exit(1);
        }
    };
    launch_board(args.board_config(), view_state);
}
