//! Key-value persistence backends for tasklist.
//!
//! A [`KeyValueStore`] is a flat namespace of string values addressed by string keys,
//! the same shape as browser local storage. [`FileStore`] keeps one file per key in a
//! directory; [`MemoryStore`] keeps everything in process.

mod error;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

pub use error::PersistenceError;

/// Result alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Minimal storage abstraction used by the task store.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns a [`PersistenceError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns a [`PersistenceError`] when the backend refuses the write.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S> KeyValueStore for &mut S
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

impl<S> KeyValueStore for Box<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-process store, used by tests and as a scratch backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, builder style.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Borrow a stored value without going through the trait.
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of keys present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Directory-backed namespace: each key is a file holding its value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the namespace rooted at `dir`.
    ///
    /// # Errors
    /// Returns [`PersistenceError::Unavailable`] if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|err| {
            PersistenceError::Unavailable(format!("cannot create {}: {err}", dir.display()))
        })?;
        info!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Directory holding the keys.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => {
                debug!(key, bytes = value.len(), "Read key");
                Ok(Some(value))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PersistenceError::io(key, err)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write beside the target and rename so readers never observe a partial value.
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|err| PersistenceError::io(key, err))?;
        tmp.write_all(value.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| PersistenceError::io(key, err))?;
        tmp.persist(&path)
            .map_err(|err| PersistenceError::io(key, err.error))?;
        debug!(key, bytes = value.len(), "Wrote key");
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidKey(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() -> Result<()> {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("todoTasks")?, None);

        store.set("todoTasks", "[]")?;
        store.set("todoTasks", "[1]")?;
        assert_eq!(store.get("todoTasks")?.as_deref(), Some("[1]"));
        assert_eq!(store.peek("todoTasks"), Some("[1]"));
        assert_eq!(store.len(), 1);
        Ok(())
    }

    #[test]
    fn keys_must_be_plain_names() {
        assert!(validate_key("taskIdCounter").is_ok());
        assert!(validate_key("todo-tasks.v1").is_ok());
        for bad in ["", ".hidden", "../escape", "a/b", "with space"] {
            assert!(
                matches!(validate_key(bad), Err(PersistenceError::InvalidKey(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn mutable_reference_forwards() -> Result<()> {
        fn write_through(mut store: impl KeyValueStore) -> Result<()> {
            store.set("k", "v")
        }

        let mut store = MemoryStore::new();
        write_through(&mut store)?;
        assert_eq!(store.peek("k"), Some("v"));
        Ok(())
    }
}
