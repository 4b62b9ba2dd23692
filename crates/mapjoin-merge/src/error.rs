use std::path::PathBuf;

use mapjoin_codec::CodecError;
use mapjoin_store::StoreError;
use thiserror::Error;

/// Errors that abort a merge run.
///
/// Per-file problems that only skip a file (missing marker, unreadable map)
/// are not errors; they are reported in [`MergeReport`](crate::MergeReport).
#[derive(Debug, Error)]
pub enum MergeError {
    /// A map's `mappings` string is malformed. Nothing is written.
    #[error("malformed mappings in {}: {source}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("manifest error: {0}")]
    Manifest(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type MergeResult<T> = Result<T, MergeError>;
