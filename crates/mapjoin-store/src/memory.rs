use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::StoreResult;
use crate::path;
use crate::traits::{strip_bom, Storage};

/// In-memory, map-based storage.
///
/// Intended for tests and embedding. Files are held behind a `RwLock` and
/// keyed by their normalized forward-slash path; there are no real
/// directories, so any prefix of a stored path counts as one.
pub struct InMemoryStorage {
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl InMemoryStorage {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert a file directly.
    pub fn insert(&self, path: impl AsRef<Path>, data: impl Into<Vec<u8>>) {
        self.files
            .write()
            .expect("lock poisoned")
            .insert(key(path.as_ref()), data.into());
    }

    /// Number of files currently stored.
    pub fn len(&self) -> usize {
        self.files.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no files are stored.
    pub fn is_empty(&self) -> bool {
        self.files.read().expect("lock poisoned").is_empty()
    }

    /// Sorted list of all stored paths.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.read().expect("lock poisoned").keys().cloned().collect()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for InMemoryStorage {
    fn read_text(&self, path: &Path) -> String {
        self.read_binary(path)
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map(strip_bom)
            .unwrap_or_default()
    }

    fn read_binary(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.read().expect("lock poisoned").get(&key(path)).cloned()
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> StoreResult<()> {
        self.insert(path, data);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.is_file(path) || self.is_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.read().expect("lock poisoned").contains_key(&key(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let dir = key(path);
        self.files
            .read()
            .expect("lock poisoned")
            .keys()
            .any(|p| p != &dir && p.starts_with(&dir))
    }
}

fn key(path: &Path) -> PathBuf {
    PathBuf::from(path::normalize(&path.to_string_lossy()))
}
