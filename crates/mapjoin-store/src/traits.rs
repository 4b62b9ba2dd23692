use std::path::Path;

use crate::error::StoreResult;

/// File access used by the merge engine.
///
/// Implementations must satisfy these rules:
/// - `read_text` returns `""` on any failure and strips a leading UTF-8 BOM.
/// - `read_binary` returns `None` on any failure.
/// - `write_file` creates every missing parent directory before writing and
///   replaces any existing file.
pub trait Storage: Send + Sync {
    /// Read a file as UTF-8 text. Returns an empty string if it cannot be read.
    fn read_text(&self, path: &Path) -> String;

    /// Read a file as raw bytes.
    fn read_binary(&self, path: &Path) -> Option<Vec<u8>>;

    /// Write `data` to `path`, creating parent directories first.
    fn write_file(&self, path: &Path, data: &[u8]) -> StoreResult<()>;

    /// Check whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Check whether `path` is a regular file.
    ///
    /// Default implementation treats anything that exists as a file.
    /// Backends with real directories should override.
    fn is_file(&self, path: &Path) -> bool {
        self.exists(path)
    }

    /// Check whether `path` is a directory.
    fn is_dir(&self, _path: &Path) -> bool {
        false
    }
}

/// Strip a leading byte-order mark, if any.
pub(crate) fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{FEFF}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}
