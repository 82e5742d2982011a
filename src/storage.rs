//! Durable key-value storage behind the quote history and item catalog.

use crate::errors::{Error, Result};
use std::fs;
use std::path::PathBuf;

pub const BUDGETS_KEY: &str = "budgets";
pub const REGISTERED_ITEMS_KEY: &str = "registeredItems";

pub trait KeyValueStore {
    /// `Ok(None)` when nothing was ever saved under `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Never fails: a directory that cannot be created only makes later
    /// reads and writes fail, which callers log and survive.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::warn!("Failed to create data directory {:?}: {}", dir, e);
        }
        FileStore { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        tracing::debug!("Loading {:?}", path);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Persistence(format!("Failed to read {:?}: {}", path, e))),
        }
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tracing::debug!("Saving {} bytes to {:?}", bytes.len(), path);
        fs::write(&tmp, bytes)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|e| Error::Persistence(format!("Failed to write {:?}: {}", path, e)))
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: std::collections::HashMap<String, Vec<u8>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
