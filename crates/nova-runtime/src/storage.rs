#![forbid(unsafe_code)]

//! Durable key-value storage for the appearance preference.
//!
//! The controller persists one string under one key. Backends implement
//! [`PreferenceStore`]; every operation can fail, and the controller treats
//! any failure as "storage unavailable" and carries on in memory.
//!
//! # Backends
//!
//! - [`MemoryStorage`]: process-local map, cloneable handle. Reads and
//!   writes can be made to fail on demand, which hosts use to model
//!   private-mode browsers or read-only profiles.
//! - [`FileStorage`] (feature `state-persistence`): a JSON object on disk,
//!   rewritten atomically via a temp file and rename. Reading a corrupt file
//!   is an error; writing replaces it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "state-persistence")]
use std::path::{Path, PathBuf};
#[cfg(feature = "state-persistence")]
use tracing::warn;

/// Errors from a storage backend.
#[derive(Debug)]
pub enum StorageError {
    /// The backend cannot be reached (no storage object, access denied).
    Unavailable(String),
    /// Filesystem failure.
    Io(std::io::Error),
    /// Stored data could not be encoded or decoded.
    Serialization(String),
    /// The backend refused the write for lack of space.
    QuotaExceeded,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Io(e) => write!(f, "storage I/O error: {e}"),
            Self::Serialization(msg) => write!(f, "storage serialization error: {msg}"),
            Self::QuotaExceeded => f.write_str("storage quota exceeded"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// A string key-value store.
pub trait PreferenceStore {
    /// Read `key`. `Ok(None)` means the key is absent.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    fn store(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> StorageResult<()>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: u64,
}

/// In-memory storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage
            .state
            .borrow_mut()
            .entries
            .insert(key.to_string(), value.to_string());
        storage
    }

    /// Make every subsequent `load` fail with [`StorageError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.state.borrow_mut().fail_reads = fail;
    }

    /// Make every subsequent `store`/`remove` fail with
    /// [`StorageError::QuotaExceeded`].
    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    /// Raw entry, bypassing failure injection.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.state.borrow().entries.get(key).cloned()
    }

    /// Number of successful `store` calls.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.state.borrow().writes
    }
}

impl PreferenceStore for MemoryStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let state = self.state.borrow();
        if state.fail_reads {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        Ok(state.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(StorageError::QuotaExceeded);
        }
        state.entries.insert(key.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(StorageError::QuotaExceeded);
        }
        state.entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// JSON-file storage.
///
/// The file holds a flat JSON object of string entries, so several Nova
/// preferences can share one file. A missing or empty file reads as empty.
#[cfg(feature = "state-persistence")]
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

#[cfg(feature = "state-persistence")]
impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Entries to rewrite, and whether the file was corrupt. A corrupt file
    /// is replaced rather than left to block every write.
    fn read_for_update(&self) -> StorageResult<(BTreeMap<String, String>, bool)> {
        match self.read_all() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Serialization(reason)) => {
                warn!(path = %self.path.display(), %reason, "replacing corrupt preference file");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(feature = "state-persistence")]
impl PreferenceStore for FileStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn store(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let (mut entries, _) = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let (mut entries, corrupt) = self.read_for_update()?;
        if entries.remove(key).is_some() || corrupt {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
