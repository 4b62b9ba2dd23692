use thiserror::Error;

/// Malformed `mappings` input.
///
/// Every variant is a format error: the input cannot be turned into a
/// mapping table, and callers treat it as fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid mapping character {ch:?} at offset {offset}")]
    InvalidCharacter { ch: char, offset: usize },

    #[error("unterminated VLQ value at offset {offset}")]
    UnterminatedVlq { offset: usize },

    #[error("VLQ value overflows 64 bits at offset {offset}")]
    VlqOverflow { offset: usize },

    #[error("accumulated value out of range at offset {offset}")]
    ValueOutOfRange { offset: usize },

    #[error("segment on line {line} has {fields} fields (expected 1, 4 or 5)")]
    InvalidSegmentLength { line: usize, fields: usize },

    /// A source position no longer fits in `i32` once offset against the
    /// previous table's final position.
    #[error("rebased source position out of range on generated line {line}")]
    RebaseOutOfRange { line: usize },
}

pub type CodecResult<T> = Result<T, CodecError>;
