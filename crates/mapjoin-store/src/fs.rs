use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::path;
use crate::traits::{strip_bom, Storage};

/// Extensions whose text is memoized by default.
pub const DEFAULT_CACHE_EXTENSIONS: &[&str] = &["ts", "exml"];

/// Filesystem-backed storage with a per-instance text memo cache.
///
/// Only files whose extension is listed in `cache_extensions` are memoized on
/// read. A write to a cacheable path replaces its cache entry. The cache is
/// owned by this instance; two `FsStorage` values never share entries.
pub struct FsStorage {
    cache: RwLock<HashMap<PathBuf, String>>,
    cache_extensions: HashSet<String>,
}

impl FsStorage {
    /// Create a storage with the default cacheable extensions.
    pub fn new() -> Self {
        Self::with_cache_extensions(DEFAULT_CACHE_EXTENSIONS.iter().copied())
    }

    /// Create a storage that memoizes text for the given extensions
    /// (case-insensitive, without the dot).
    pub fn with_cache_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            cache: RwLock::new(HashMap::new()),
            cache_extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Number of memoized entries.
    pub fn cached_len(&self) -> usize {
        self.cache.read().expect("lock poisoned").len()
    }

    /// Drop every memoized entry.
    pub fn clear_cache(&self) {
        self.cache.write().expect("lock poisoned").clear();
    }

    /// Read text from disk, bypassing (but refreshing) the memo cache.
    pub fn read_text_uncached(&self, path: &Path) -> String {
        let key = cache_key(path);
        let text = match fs::read_to_string(&key) {
            Ok(text) => strip_bom(text),
            Err(e) => {
                debug!(path = %key.display(), error = %e, "read failed");
                return String::new();
            }
        };
        if !text.is_empty() && self.is_cacheable(&key) {
            self.cache
                .write()
                .expect("lock poisoned")
                .insert(key, text.clone());
        }
        text
    }

    /// Recursively list regular files under `dir`, sorted by path.
    ///
    /// Entries whose name starts with `.` are skipped along with their
    /// subtrees. `filter` decides which files are returned.
    pub fn list_files<F>(&self, dir: &Path, mut filter: F) -> StoreResult<Vec<PathBuf>>
    where
        F: FnMut(&Path) -> bool,
    {
        if !dir.is_dir() {
            return Err(StoreError::NotFound(dir.to_path_buf()));
        }
        let mut files = Vec::new();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry.map_err(|e| StoreError::Walk {
                root: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
            if entry.file_type().is_file() && filter(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Recursively list files under `dir` with the given extension.
    pub fn list_files_with_extension(&self, dir: &Path, ext: &str) -> StoreResult<Vec<PathBuf>> {
        let ext = ext.to_ascii_lowercase();
        self.list_files(dir, |p| {
            path::extension(&p.to_string_lossy()).to_ascii_lowercase() == ext
        })
    }

    fn is_cacheable(&self, path: &Path) -> bool {
        let ext = path::extension(&path.to_string_lossy()).to_ascii_lowercase();
        self.cache_extensions.contains(&ext)
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for FsStorage {
    fn read_text(&self, path: &Path) -> String {
        let key = cache_key(path);
        if let Some(text) = self.cache.read().expect("lock poisoned").get(&key) {
            return text.clone();
        }
        self.read_text_uncached(&key)
    }

    fn read_binary(&self, path: &Path) -> Option<Vec<u8>> {
        fs::read(cache_key(path)).ok()
    }

    fn write_file(&self, path: &Path, data: &[u8]) -> StoreResult<()> {
        let key = cache_key(path);
        if let Some(parent) = key.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&key, data)?;
        debug!(path = %key.display(), bytes = data.len(), "wrote file");

        let mut cache = self.cache.write().expect("lock poisoned");
        match std::str::from_utf8(data) {
            Ok(text) if self.is_cacheable(&key) => {
                cache.insert(key, text.to_string());
            }
            _ => {
                cache.remove(&key);
            }
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        cache_key(path).exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        cache_key(path).is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        cache_key(path).is_dir()
    }
}

/// Normalized, forward-slash form of `path` used for I/O and cache keys.
fn cache_key(path: &Path) -> PathBuf {
    PathBuf::from(path::to_unix(&path.to_string_lossy()))
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}
