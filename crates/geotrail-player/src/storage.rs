//! Device-local key-value storage and player stores.
//!
//! [`KeyValueStorage`] is the injected stand-in for a browser's local
//! storage: string keys, string values, survives restarts when backed by
//! [`FileStorage`]. [`PlayerStore`] is the optional persistence collaborator
//! a [`crate::Player`] writes its snapshot to.
//!
//! # Key Patterns
//!
//! | Pattern | Value | Written by |
//! |---------|-------|------------|
//! | `uuid` | Plain UUID string | `LocalPlayer` identity resolution |
//! | `player:{uuid}` | JSON [`PlayerRecord`] | [`KvPlayerStore`] |

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use geotrail_types::{PlayerId, PlayerRecord};

use crate::error::StorageError;

/// String key-value storage local to a device.
pub trait KeyValueStorage {
    /// Read the value at `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` at `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;

    /// Delete every key.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// In-process storage, lost when dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        Ok(())
    }
}

/// Storage persisted as a single JSON object on disk.
///
/// The whole file is read on open and rewritten on every mutation.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStorage {
    /// Open the storage at `path`. A missing file is an empty storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be read.
    /// Returns [`StorageError::Serialization`] if it is not a JSON object of
    /// strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), keys = items.len(), "opened file storage");
        Ok(Self { path, items })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&self.items)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, json).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.flush()
    }
}

/// Persistence collaborator for player snapshots.
pub trait PlayerStore {
    /// Write `record`, replacing any previous record for the same player.
    fn put(&mut self, record: &PlayerRecord) -> Result<(), StorageError>;

    /// Read the record for `id`, if one was written.
    fn get(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StorageError>;
}

/// Key under which [`KvPlayerStore`] keeps a player's record.
pub fn player_key(id: PlayerId) -> String {
    format!("player:{id}")
}

/// A [`PlayerStore`] writing JSON records into any [`KeyValueStorage`].
#[derive(Debug, Clone, Default)]
pub struct KvPlayerStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> KvPlayerStore<S> {
    /// Wrap `storage`.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The wrapped storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Unwrap the storage.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

impl<S: KeyValueStorage> PlayerStore for KvPlayerStore<S> {
    fn put(&mut self, record: &PlayerRecord) -> Result<(), StorageError> {
        let json = serde_json::to_string(record)?;
        self.storage.set_item(&player_key(record.uuid), &json)
    }

    fn get(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StorageError> {
        self.storage
            .get_item(&player_key(id))?
            .map(|json| serde_json::from_str(&json).map_err(StorageError::from))
            .transpose()
    }
}
