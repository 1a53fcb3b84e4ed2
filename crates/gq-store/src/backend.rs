//! Key/value storage backends
//!
//! A backend stores one string value per key, the way browser local storage
//! does. The repository decides what the value means.

use crate::error::StoreError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::trace;

/// String key/value storage
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Value under `key`, `None` if absent
    ///
    /// # Errors
    /// Backend failure or invalid key.
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`
    ///
    /// # Errors
    /// Backend failure or invalid key.
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; absent keys are not an error
    ///
    /// # Errors
    /// Backend failure or invalid key.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// One `<key>.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Backend rooted at `dir`; the directory is created on first write
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`
    ///
    /// # Errors
    /// Returns `InvalidKey` for keys outside `[A-Za-z0-9_-]`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;

        // Write then rename so readers never see a torn file
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| StoreError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| StoreError::io(&path, e))?;
        trace!(path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}

/// In-process backend
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Empty backend
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with one value
    #[must_use]
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.entries.write().insert(key.into(), value.into());
        backend
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.write().remove(key);
        Ok(())
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for std::sync::Arc<B> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_like_keys() {
        let backend = MemoryBackend::new();
        assert!(matches!(backend.read("../etc"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(backend.write("", "x"), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn file_backend_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("store"));

        assert_eq!(backend.read("k").unwrap(), None);
        backend.write("k", "{\"a\":1}").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.path().join("store").join("k.json").exists());

        backend.remove("k").unwrap();
        backend.remove("k").unwrap();
        assert_eq!(backend.read("k").unwrap(), None);
    }

    #[test]
    fn memory_backend_overwrites() {
        let backend = MemoryBackend::with_value("k", "1");
        backend.write("k", "2").unwrap();
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("2"));
    }
}
