use std::fs::{File, OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR: &str = "tmp";
const LOG_BASENAME: &str = "odds_board";

fn log_path() -> PathBuf {
    let ts_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let pid = std::process::id();
    let filename = format!("{LOG_BASENAME}_{ts_ms}_pid{pid}.log");
    Path::new(LOG_DIR).join(filename)
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if let Err(err) = create_dir_all(parent) {
            eprintln!("[log] failed to create log dir {:?}: {err}", parent);
            return None;
        }
    }
    match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
    {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("[log] failed to open log file {:?}: {err}", path);
            None
        }
    }
}

/// Install the global subscriber: stdout plus a per-run file under `tmp/`.
/// `RUST_LOG` overrides the default `info` level. Returns the log file path
/// when one could be opened; calling this twice is a no-op.
pub fn init_logging() -> Option<PathBuf> {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let path = log_path();
    let file_layer = open_log_file(&path).map(|file| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(Mutex::new(file))
    });
    let opened = file_layer.is_some();

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .try_init()
        .is_ok();

    (installed && opened).then_some(path)
}
