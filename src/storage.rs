//! Persisted boolean flags.
//!
//! The funnel keeps exactly one piece of state across sessions: whether this
//! client has already reached the final screen. Stores only ever set flags;
//! nothing in the crate clears one.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access flag file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("flag file {path} is not a JSON object of booleans: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Key-value boolean store.
pub trait FlagStore {
    fn is_set(&self, key: &str) -> Result<bool, StorageError>;

    fn set(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Reads a flag, treating an unreadable store as "not set".
pub fn read_flag(store: &dyn FlagStore, key: &str) -> bool {
    match store.is_set(key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, error = %err, "flag store unreadable, treating flag as unset");
            false
        }
    }
}

/// Flags kept for the lifetime of the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryFlagStore {
    flags: HashSet<String>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts with `key` already set.
    pub fn with_flag(key: &str) -> Self {
        let mut flags = HashSet::new();
        flags.insert(key.to_string());
        Self { flags }
    }
}

impl FlagStore for MemoryFlagStore {
    fn is_set(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.flags.contains(key))
    }

    fn set(&mut self, key: &str) -> Result<(), StorageError> {
        self.flags.insert(key.to_string());
        Ok(())
    }
}

/// Flags persisted as a JSON object in a single file.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

impl FileFlagStore {
    pub const FILE_NAME: &'static str = "flags.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/flags.json`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, bool>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => return Err(self.io_error(err)),
        };
        serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }
}

impl FlagStore for FileFlagStore {
    fn is_set(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.load()?.get(key).copied().unwrap_or(false))
    }

    fn set(&mut self, key: &str) -> Result<(), StorageError> {
        // A corrupt file is overwritten; a file that cannot be read is not.
        let mut flags = match self.load() {
            Ok(flags) => flags,
            Err(StorageError::Corrupt { .. }) => BTreeMap::new(),
            Err(err) => return Err(err),
        };
        flags.insert(key.to_string(), true);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let json = serde_json::to_string_pretty(&flags).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(key, path = %self.path.display(), "flag persisted");
        Ok(())
    }
}
