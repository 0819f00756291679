//! Persistence slots for the quest list
//!
//! A slot is a single named key holding the JSON-serialized quest list,
//! the desktop counterpart of a browser `localStorage` entry. It is a
//! best-effort cache: the in-memory store stays authoritative.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::StorageError;

/// Key under which the quest list is stored.
pub const QUESTS_KEY: &str = "fluxora_quests";

/// A flat key-value slot holding one serialized value.
pub trait QuestSlot: Send + Sync {
    /// Returns the slot's key.
    fn key(&self) -> &str;

    /// Reads the stored value, `None` if nothing was stored yet.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Overwrites the stored value.
    fn save(&self, contents: &str) -> Result<(), StorageError>;
}

/// In-memory slot. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot pre-filled with `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(Mutex::new(Some(contents.into()))),
        }
    }

    /// Returns the currently stored value.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl QuestSlot for MemorySlot {
    fn key(&self) -> &str {
        QUESTS_KEY
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.contents())
    }

    fn save(&self, contents: &str) -> Result<(), StorageError> {
        *self.contents.lock() = Some(contents.to_string());
        Ok(())
    }
}

/// Slot backed by a JSON file in a data directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    /// Creates a slot at `<dir>/fluxora_quests.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{QUESTS_KEY}.json")),
        }
    }

    /// Creates a slot at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuestSlot for FileSlot {
    fn key(&self) -> &str {
        QUESTS_KEY
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, contents: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Replace atomically; readers never see a partial list.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_memory_slot_shared_between_clones() {
        let slot = MemorySlot::new();
        let observer = slot.clone();
        assert_eq!(slot.load().unwrap(), None);

        slot.save("[]").unwrap();
        assert_eq!(observer.contents().as_deref(), Some("[]"));
    }

    #[test]
    fn test_file_slot_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::in_dir(dir.path());
        assert_eq!(slot.load().unwrap(), None);
        assert!(slot.path().ends_with("fluxora_quests.json"));
    }

    #[test]
    fn test_file_slot_save_and_load() {
        let dir = TempDir::new().unwrap();
        let slot = FileSlot::in_dir(dir.path().join("nested"));
        slot.save("[1,2,3]").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("[1,2,3]"));

        slot.save("[]").unwrap();
        assert_eq!(slot.load().unwrap().as_deref(), Some("[]"));
    }
}
