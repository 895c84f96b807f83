//! Named-slot key-value persistence.
//!
//! Each slot holds one UTF-8 string. The file backend keeps one
//! `<slot>.json` per slot inside the app data directory; the memory backend
//! backs tests and `--ephemeral` runs.

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::RwLock,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on slot '{slot}': {source}")]
    Io {
        slot: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid slot name '{0}'")]
    InvalidSlot(String),

    #[error("Store is read-only")]
    ReadOnly,
}

pub type Result<T> = std::result::Result<T, StoreError>;

pub trait PersistentStore: Send + Sync {
    /// `Ok(None)` when the slot has never been written.
    fn read(&self, slot: &str) -> Result<Option<String>>;

    fn write(&self, slot: &str, contents: &str) -> Result<()>;
}

fn validate_slot(slot: &str) -> Result<()> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSlot(slot.to_string()))
    }
}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            slot: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}

impl PersistentStore for FileStore {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        validate_slot(slot)?;
        match fs::read_to_string(self.slot_path(slot)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                slot: slot.to_string(),
                source,
            }),
        }
    }

    fn write(&self, slot: &str, contents: &str) -> Result<()> {
        validate_slot(slot)?;
        let path = self.slot_path(slot);
        let tmp_path = self.dir.join(format!(".{slot}.json.tmp"));

        // Rename over the old file so a crash mid-write never leaves a torn slot.
        fs::write(&tmp_path, contents)
            .and_then(|_| fs::rename(&tmp_path, &path))
            .map_err(|source| StoreError::Io {
                slot: slot.to_string(),
                source,
            })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(slot: &str, contents: &str) -> Self {
        let store = Self::new();
        store
            .slots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(slot.to_string(), contents.to_string());
        store
    }
}

impl PersistentStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<String>> {
        validate_slot(slot)?;
        let guard = self
            .slots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(guard.get(slot).cloned())
    }

    fn write(&self, slot: &str, contents: &str) -> Result<()> {
        validate_slot(slot)?;
        let mut guard = self
            .slots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(slot.to_string(), contents.to_string());
        Ok(())
    }
}
