use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ViewStateError {
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
    #[error("failed to encode slot '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to decode slot '{key}' from '{value}': {source}")]
    Decode {
        key: String,
        value: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("option id '{0}' is not unique")]
    DuplicateOptionId(String),
    #[error("match generator failed: {0}")]
    Generator(String),
    #[error(transparent)]
    ViewState(#[from] ViewStateError),
}
