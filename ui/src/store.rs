use std::path::PathBuf;

use odds_core::{DuckDbStore, StorageMode, StoreError, ViewState};
use tracing::warn;

pub const DEFAULT_STATE_PATH: &str = "data/board.duckdb";

/// Open the view state backed by DuckDB at `path`, falling back to an
/// in-memory store when the file cannot be used.
pub fn open_view_state(path: Option<PathBuf>, mode: StorageMode) -> Result<ViewState, StoreError> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_PATH));
    match DuckDbStore::new(&path, mode) {
        Ok(store) => Ok(ViewState::open(store)),
        Err(err) => {
            warn!(path = %path.display(), %err, "view state store unavailable, keeping it in memory");
            ViewState::in_memory()
        }
    }
}

pub fn default_view_state() -> Result<ViewState, StoreError> {
    open_view_state(None, StorageMode::Both)
}
