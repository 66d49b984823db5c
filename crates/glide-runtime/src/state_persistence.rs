#![forbid(unsafe_code)]

//! Key-value persistence for small pieces of overlay state.
//!
//! The secondary swipe channel stores its toggle mode here so the choice
//! survives remounts and restarts. Hosts provide their own [`KeyValueStore`]
//! or use one of the two bundled stores:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               KeyValueStore                  │
//! │   - MemoryStore: in-memory (tests, ephemeral) │
//! │   - FileStore: JSON file (state-persistence)  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. Storage failures never panic; every operation returns a `Result`.
//! 2. File writes go through a temporary file and a rename, so a crash
//!    mid-write leaves the previous contents intact.
//! 3. A missing key is `Ok(None)`, not an error.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returned to caller |
//! | `StorageError::Serialization` | JSON encode/decode | Returned to caller |
//! | `StorageError::Corruption` | Poisoned lock, bad format version | Returned to caller |
//! | `StorageError::Unavailable` | Host store offline | Returned to caller |
//!
//! # Feature Gates
//!
//! - `state-persistence`: enables [`FileStore`] (JSON via `serde_json`).

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from a key-value store.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    #[cfg(feature = "state-persistence")]
    Serialization(String),
    /// Stored data is unreadable or the store is in a bad state.
    Corruption(String),
    /// The store cannot be reached right now.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "store I/O failed: {e}"),
            #[cfg(feature = "state-persistence")]
            StorageError::Serialization(msg) => write!(f, "store encoding failed: {msg}"),
            StorageError::Corruption(msg) => write!(f, "store is corrupt: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Store trait
// ─────────────────────────────────────────────────────────────────────────────

/// A string key-value store.
pub trait KeyValueStore {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove every stored value.
    fn clear(&self) -> StorageResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory store. Contents are lost when it is dropped.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one value.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut data = HashMap::new();
        data.insert(key.to_owned(), value.to_owned());
        Self {
            data: RwLock::new(data),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data
            .write()
            .map_err(poisoned)?
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.data.write().map_err(poisoned)?.clear();
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StorageError {
    StorageError::Corruption("memory store lock poisoned".into())
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.data.read().map_or(0, |data| data.len());
        f.debug_struct("MemoryStore").field("entries", &entries).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store (requires state-persistence feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "state-persistence")]
mod file_store {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk layout.
    #[derive(Serialize, Deserialize)]
    struct StoreFile {
        format_version: u32,
        values: HashMap<String, String>,
    }

    impl StoreFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// JSON file store.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "values": { "secondary_mode": "alternate" }
    /// }
    /// ```
    ///
    /// Every `set` rewrites the whole file: write `{path}.tmp`, sync, then
    /// rename over `{path}`.
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        /// Create a store backed by `path`. The file is created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        /// Path of the backing file.
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn load(&self) -> StorageResult<HashMap<String, String>> {
            if !self.path.exists() {
                return Ok(HashMap::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let file: StoreFile = serde_json::from_reader(reader).map_err(|e| {
                StorageError::Serialization(format!("failed to parse store file: {e}"))
            })?;
            if file.format_version != StoreFile::FORMAT_VERSION {
                return Err(StorageError::Corruption(format!(
                    "unsupported format version {}",
                    file.format_version
                )));
            }
            Ok(file.values)
        }

        fn save(&self, values: HashMap<String, String>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = StoreFile {
                format_version: StoreFile::FORMAT_VERSION,
                values,
            };
            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, &file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize store: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;
            tracing::debug!(
                path = %self.path.display(),
                entries = file.values.len(),
                "saved key-value store"
            );
            Ok(())
        }
    }

    impl KeyValueStore for FileStore {
        fn name(&self) -> &str {
            "FileStore"
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.load()?.remove(key))
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut values = self.load()?;
            values.insert(key.to_owned(), value.to_owned());
            self.save(values)
        }

        fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }
    }

    impl fmt::Debug for FileStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStore").field("path", &self.path).finish()
        }
    }
}

#[cfg(feature = "state-persistence")]
pub use file_store::FileStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("mode").unwrap(), None);
        store.set("mode", "alternate").unwrap();
        assert_eq!(store.get("mode").unwrap().as_deref(), Some("alternate"));
    }

    #[test]
    fn memory_store_overwrites_and_clears() {
        let store = MemoryStore::with_value("mode", "default");
        store.set("mode", "alternate").unwrap();
        assert_eq!(store.get("mode").unwrap().as_deref(), Some("alternate"));
        store.clear().unwrap();
        assert_eq!(store.get("mode").unwrap(), None);
    }

    #[test]
    fn memory_store_debug_shows_count() {
        let store = MemoryStore::with_value("a", "1");
        assert!(format!("{store:?}").contains("entries: 1"));
    }

    #[test]
    fn error_display() {
        let err = StorageError::Unavailable("offline".into());
        assert_eq!(err.to_string(), "store unavailable: offline");
        let io: StorageError = std::io::Error::other("disk").into();
        assert!(std::error::Error::source(&io).is_some());
    }
}
