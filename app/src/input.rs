use clap::ValueEnum;
use odds_core::{HighlightPolicy, StorageMode};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum StorageArg {
    Memory,
    Disk,
    Both,
}

impl From<StorageArg> for StorageMode {
    fn from(arg: StorageArg) -> Self {
        match arg {
            StorageArg::Memory => StorageMode::Memory,
            StorageArg::Disk => StorageMode::Disk,
            StorageArg::Both => StorageMode::Both,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum HighlightArg {
    /// Flash only rows on screen.
    Visible,
    Always,
}

impl From<HighlightArg> for HighlightPolicy {
    fn from(arg: HighlightArg) -> Self {
        match arg {
            HighlightArg::Visible => HighlightPolicy::VisibleOnly,
            HighlightArg::Always => HighlightPolicy::Always,
        }
    }
}
