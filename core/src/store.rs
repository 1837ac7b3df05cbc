use std::path::Path;

use duckdb::{Connection, params};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Memory,
    Disk,
    Both,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no storage backend available")]
    NoBackend,
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),
    #[error("failed to prepare store directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Key/value session store. In `Both` mode every write lands in memory and on
/// disk; reads prefer memory.
pub struct DuckDbStore {
    memory: Option<Connection>,
    disk: Option<Connection>,
}

impl DuckDbStore {
    pub fn new(path: impl AsRef<Path>, mode: StorageMode) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let (memory, disk) = match mode {
            StorageMode::Memory => (Some(open_memory()?), None),
            StorageMode::Disk => (None, Some(open_disk(path)?)),
            StorageMode::Both => (Some(open_memory()?), Some(open_disk(path)?)),
        };
        Ok(Self { memory, disk })
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Ok(Self {
            memory: Some(open_memory()?),
            disk: None,
        })
    }

    fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.memory.iter().chain(self.disk.iter())
    }

    pub fn set_session_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.connections().count() == 0 {
            return Err(StoreError::NoBackend);
        }
        for conn in self.connections() {
            conn.execute(
                "INSERT INTO session_state(key, value) VALUES (?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
        }
        Ok(())
    }

    pub fn get_session_value(&self, key: &str) -> Result<Option<String>, StoreError> {
        for conn in self.connections() {
            let mut stmt = conn.prepare("SELECT value FROM session_state WHERE key = ? LIMIT 1")?;
            let mut rows = stmt.query([key])?;
            if let Some(row) = rows.next()? {
                let v: String = row.get(0)?;
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    pub fn remove_session_value(&self, key: &str) -> Result<(), StoreError> {
        if self.connections().count() == 0 {
            return Err(StoreError::NoBackend);
        }
        for conn in self.connections() {
            conn.execute("DELETE FROM session_state WHERE key = ?", params![key])?;
        }
        Ok(())
    }
}

fn open_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn open_disk(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS session_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn temp_path() -> std::path::PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("odds-board-store-{nonce}-{seq}.duckdb"))
    }

    #[test]
    fn roundtrip_memory() {
        let store = DuckDbStore::in_memory().unwrap();
        assert_eq!(store.get_session_value("scrollOffset").unwrap(), None);
        store.set_session_value("scrollOffset", "160").unwrap();
        store.set_session_value("scrollOffset", "240").unwrap();
        assert_eq!(
            store.get_session_value("scrollOffset").unwrap(),
            Some("240".to_string())
        );
        store.remove_session_value("scrollOffset").unwrap();
        assert_eq!(store.get_session_value("scrollOffset").unwrap(), None);
    }

    #[test]
    fn memory_mode_leaves_no_file_behind() {
        let path = temp_path();
        let store = DuckDbStore::new(&path, StorageMode::Memory).unwrap();
        store.set_session_value("selectedOddsIds", "[]").unwrap();
        assert_eq!(
            store.get_session_value("selectedOddsIds").unwrap(),
            Some("[]".to_string())
        );
        drop(store);
        assert!(!path.exists());
    }

    #[test]
    fn disk_values_survive_reopen() {
        let path = temp_path();
        let store = DuckDbStore::new(&path, StorageMode::Disk).unwrap();
        store
            .set_session_value("selectedOddsIds", r#"["match-1-1X2-1"]"#)
            .expect("set session");
        drop(store);

        let reopened = DuckDbStore::new(&path, StorageMode::Both).unwrap();
        let saved = reopened
            .get_session_value("selectedOddsIds")
            .expect("get session");
        assert_eq!(saved, Some(r#"["match-1-1X2-1"]"#.to_string()));
        drop(reopened);
        std::fs::remove_file(path).ok();
    }
}
