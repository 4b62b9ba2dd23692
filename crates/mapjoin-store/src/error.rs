use std::path::PathBuf;

/// Errors from storage operations.
///
/// Reads never fail loudly: a missing or unreadable file surfaces as empty
/// content. Only writes and listings report errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested path does not exist.
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Directory traversal failed.
    #[error("walk error under {}: {reason}", root.display())]
    Walk { root: PathBuf, reason: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
