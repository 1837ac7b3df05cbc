use std::collections::BTreeSet;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::ViewStateError;
use crate::store::{DuckDbStore, StoreError};

pub const SELECTED_ODDS_KEY: &str = "selectedOddsIds";
pub const SCROLL_OFFSET_KEY: &str = "scrollOffset";

/// String-keyed durable storage with read-your-writes semantics.
pub trait SessionBackend: Send {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl SessionBackend for DuckDbStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.get_session_value(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_session_value(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.remove_session_value(key)
    }
}

/// Scroll offset and selection, cached in memory and written through on every
/// change. Each slot is read and written on its own, so a broken slot falls
/// back to its default without touching the other.
pub struct ViewState {
    backend: Box<dyn SessionBackend>,
    selected: BTreeSet<String>,
    scroll_offset: f32,
}

impl ViewState {
    pub fn open(backend: impl SessionBackend + 'static) -> Self {
        let backend: Box<dyn SessionBackend> = Box::new(backend);
        let selected = read_slot(backend.as_ref(), SELECTED_ODDS_KEY, BTreeSet::new());
        let scroll_offset =
            sanitize_offset(read_slot(backend.as_ref(), SCROLL_OFFSET_KEY, 0.0f32));
        debug!(
            selected = selected.len(),
            scroll_offset, "restored persisted view state"
        );
        Self {
            backend,
            selected,
            scroll_offset,
        }
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self::open(DuckDbStore::in_memory()?))
    }

    /// Read `key`, or `default` when the slot is missing or unreadable.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        read_slot(self.backend.as_ref(), key, default)
    }

    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ViewStateError> {
        let Some(raw) = self.backend.load(key)? else {
            return Ok(None);
        };
        decode(key, &raw).map(Some)
    }

    /// Write `key` through to the backend. The typed slots refresh their
    /// cached value first, so the cache always matches the last write.
    pub fn set<T: Serialize + ?Sized>(
        &mut self,
        key: &str,
        value: &T,
    ) -> Result<(), ViewStateError> {
        let mut encoded = encode(key, value)?;
        match key {
            SELECTED_ODDS_KEY => self.selected = decode(key, &encoded)?,
            SCROLL_OFFSET_KEY => {
                let offset = sanitize_offset(decode(key, &encoded)?);
                encoded = encode(key, &offset)?;
                self.scroll_offset = offset;
            }
            _ => {}
        }
        self.backend.save(key, &encoded)?;
        Ok(())
    }

    /// Keep only the selected ids for which `keep` holds, writing the set back
    /// when anything was dropped. Returns how many ids were dropped.
    pub fn retain_selected(
        &mut self,
        mut keep: impl FnMut(&str) -> bool,
    ) -> Result<usize, ViewStateError> {
        let before = self.selected.len();
        self.selected.retain(|id| keep(id));
        let dropped = before - self.selected.len();
        if dropped > 0 {
            self.write(SELECTED_ODDS_KEY, &self.selected)?;
        }
        Ok(dropped)
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), ViewStateError> {
        let encoded = encode(key, value)?;
        self.backend.save(key, &encoded)?;
        Ok(())
    }

    pub fn selected_option_ids(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, option_id: &str) -> bool {
        self.selected.contains(option_id)
    }

    /// Flip membership of `option_id`; returns whether it is now selected.
    /// The cached set changes even if the write fails.
    pub fn toggle_selected(&mut self, option_id: &str) -> Result<bool, ViewStateError> {
        let selected = if self.selected.remove(option_id) {
            false
        } else {
            self.selected.insert(option_id.to_string());
            true
        };
        self.write(SELECTED_ODDS_KEY, &self.selected)?;
        Ok(selected)
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: f32) -> Result<(), ViewStateError> {
        if offset == self.scroll_offset {
            return Ok(());
        }
        self.scroll_offset = offset;
        self.write(SCROLL_OFFSET_KEY, &offset)
    }

    /// Forget both slots, in memory and in the backend.
    pub fn reset(&mut self) -> Result<(), ViewStateError> {
        self.selected.clear();
        self.scroll_offset = 0.0;
        let selected = self.backend.remove(SELECTED_ODDS_KEY);
        let scroll = self.backend.remove(SCROLL_OFFSET_KEY);
        selected?;
        scroll?;
        Ok(())
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, ViewStateError> {
    serde_json::to_string(value).map_err(|source| ViewStateError::Encode {
        key: key.to_string(),
        source,
    })
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, ViewStateError> {
    serde_json::from_str(raw).map_err(|source| ViewStateError::Decode {
        key: key.to_string(),
        value: raw.to_string(),
        source,
    })
}

fn sanitize_offset(offset: f32) -> f32 {
    if offset.is_finite() {
        offset.max(0.0)
    } else {
        0.0
    }
}

fn read_slot<T: DeserializeOwned>(backend: &dyn SessionBackend, key: &str, default: T) -> T {
    match backend.load(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "discarding unreadable view state slot");
                default
            }
        },
        Ok(None) => default,
        Err(err) => {
            warn!(key, %err, "view state slot unavailable, using default");
            default
        }
    }
}
