//! Per-domain table persistence.
//!
//! Every generator domain owns one JSON slot under `<data_dir>/tables/`,
//! named by a version-suffixed key (`books_v3.json`, `shops_v2.json`, ...).
//! The slot holds the entire table set for that domain as the user last
//! saved it; absence is a valid state and means "use the built-in defaults".
//!
//! Load never fails: a missing file, unparseable JSON, or a shape that the
//! current version's validator rejects all degrade to defaults with a
//! `log::warn!`. Save is strict: edited JSON is parsed and validated first,
//! and only a fully valid document is committed; on any failure the previous
//! slot contents (and the in-memory tables) stay untouched.
//!
//! File access is guarded with `fs2` locks, shared for read and exclusive
//! for write.

use fs2::FileExt;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors surfaced to the user by the strict save path. The load path
/// absorbs these and falls back to defaults instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid data structure: {0}")]
    Invalid(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle on the tables directory for one data dir.
#[derive(Debug, Clone)]
pub struct TableStore {
    tables_dir: PathBuf,
}

impl TableStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        TableStore {
            tables_dir: data_dir.as_ref().join("tables"),
        }
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.tables_dir.join(format!("{key}.json"))
    }

    /// Raw slot text, if the slot exists and is readable.
    pub fn raw(&self, key: &str) -> Option<String> {
        let path = self.slot_path(key);
        let mut file = fs::OpenOptions::new().read(true).open(&path).ok()?;
        let _ = file.lock_shared();
        let mut text = String::new();
        if let Err(e) = file.read_to_string(&mut text) {
            log::warn!("store: failed reading {}: {}", path.display(), e);
            return None;
        }
        Some(text)
    }

    /// Load a domain's tables, falling back to `default` when the slot is
    /// absent, unparseable, or rejected by `validate`. A structure mismatch
    /// is treated identically to "no data"; no migration is attempted.
    pub fn load<T, F>(&self, key: &str, validate: fn(&T) -> Result<(), String>, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let text = match self.raw(key) {
            Some(text) => text,
            None => return default(),
        };
        match serde_json::from_str::<T>(&text) {
            Ok(tables) => match validate(&tables) {
                Ok(()) => tables,
                Err(reason) => {
                    log::warn!("store: saved tables for '{key}' failed validation ({reason}), resetting to defaults");
                    default()
                }
            },
            Err(e) => {
                log::warn!("store: failed to parse saved tables for '{key}': {e}, resetting to defaults");
                default()
            }
        }
    }

    /// Validate user-edited JSON text and, only if it passes, commit it to
    /// the slot. Returns the parsed tables so the caller can swap them into
    /// memory atomically with the commit.
    pub fn save<T>(
        &self,
        key: &str,
        json: &str,
        validate: fn(&T) -> Result<(), String>,
    ) -> Result<T, StoreError>
    where
        T: DeserializeOwned,
    {
        let tables: T = serde_json::from_str(json)?;
        validate(&tables).map_err(StoreError::Invalid)?;

        fs::create_dir_all(&self.tables_dir)?;
        let path = self.slot_path(key);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)?;
        let _ = file.lock_exclusive();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        Ok(tables)
    }

    /// Delete the slot; defaults apply from the next load.
    pub fn reset(&self, key: &str) -> Result<(), StoreError> {
        let path = self.slot_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Demo {
        entries: Vec<String>,
    }

    fn demo_default() -> Demo {
        Demo {
            entries: vec!["default".into()],
        }
    }

    fn demo_validate(d: &Demo) -> Result<(), String> {
        if d.entries.is_empty() {
            Err("missing 'entries'".into())
        } else {
            Ok(())
        }
    }

    #[test]
    fn absent_slot_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path());
        let loaded = store.load("demo_v1", demo_validate, demo_default);
        assert_eq!(loaded, demo_default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path());
        let json = r#"{"entries":["one","two"]}"#;
        store.save::<Demo>("demo_v1", json, demo_validate).unwrap();
        let loaded = store.load("demo_v1", demo_validate, demo_default);
        assert_eq!(loaded.entries, vec!["one", "two"]);
        // raw text is preserved byte-for-byte
        assert_eq!(store.raw("demo_v1").unwrap(), json);
    }

    #[test]
    fn save_rejects_bad_json_and_leaves_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path());
        store
            .save::<Demo>("demo_v1", r#"{"entries":["keep"]}"#, demo_validate)
            .unwrap();

        let err = store
            .save::<Demo>("demo_v1", "{ not json", demo_validate)
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));

        let err = store
            .save::<Demo>("demo_v1", r#"{"entries":[]}"#, demo_validate)
            .unwrap_err();
        assert!(err.to_string().contains("invalid data structure"));

        let loaded = store.load("demo_v1", demo_validate, demo_default);
        assert_eq!(loaded.entries, vec!["keep"]);
    }

    #[test]
    fn corrupt_slot_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path());
        fs::create_dir_all(store.tables_dir.clone()).unwrap();
        fs::write(store.slot_path("demo_v1"), "garbage{{").unwrap();
        let loaded = store.load("demo_v1", demo_validate, demo_default);
        assert_eq!(loaded, demo_default());
    }

    #[test]
    fn reset_removes_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = TableStore::new(dir.path());
        store
            .save::<Demo>("demo_v1", r#"{"entries":["x"]}"#, demo_validate)
            .unwrap();
        store.reset("demo_v1").unwrap();
        assert!(store.raw("demo_v1").is_none());
        // resetting an absent slot is fine
        store.reset("demo_v1").unwrap();
    }
}
