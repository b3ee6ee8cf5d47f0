//! Persistent key/value storage for session data.
//!
//! [`MemoryStorage`] backs tests and ephemeral sessions; [`FileStorage`]
//! keeps the same flat string map in a JSON file readable only by its owner.

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use crate::error::{ClientError, ClientResult};

/// Flat string storage in the manner of browser local storage.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Reads a value.
    ///
    /// # Errors
    /// Returns [`ClientError::Storage`] if the backing store is unreadable.
    fn get(&self, key: &str) -> ClientResult<Option<String>>;

    /// Writes a value.
    ///
    /// # Errors
    /// Returns [`ClientError::Storage`] if the backing store is unwritable.
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;

    /// Removes a value; removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns [`ClientError::Storage`] if the backing store is unwritable.
    fn remove(&self, key: &str) -> ClientResult<()>;
}

fn lock(map: &Mutex<BTreeMap<String, String>>) -> ClientResult<MutexGuard<'_, BTreeMap<String, String>>> {
    map.lock()
        .map_err(|_| ClientError::storage("storage lock poisoned"))
}

/// Storage that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated storage.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Copy of every stored entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// JSON-file storage. The whole map is rewritten on every change, and the
/// in-memory copy only moves once the write has succeeded.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Opens the store at `path`. A missing file is an empty store; an
    /// unreadable or corrupt one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "ignoring corrupt session file");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot read session file");
                BTreeMap::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> ClientResult<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(ClientError::storage(format!(
                    "failed to remove {}: {err}",
                    self.path.display()
                ))),
            };
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ClientError::storage(format!(
                    "failed to create session directory {}: {err}",
                    parent.display()
                ))
            })?;
        }
        let body = serde_json::to_string_pretty(entries)
            .map_err(|err| ClientError::storage(err.to_string()))?;
        fs::write(&self.path, body).map_err(|err| {
            ClientError::storage(format!("failed to write {}: {err}", self.path.display()))
        })?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|err| {
                ClientError::storage(format!("failed to set session file permissions: {err}"))
            })?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut entries = lock(&self.entries)?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let mut entries = lock(&self.entries)?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}
