use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid segment field count: expected 1, 4 or 5, got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid source map document: {0}")]
    Json(String),
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
