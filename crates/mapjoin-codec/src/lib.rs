//! Mappings codec for mapjoin.
//!
//! Converts between the compact `mappings` string of a version-3 source map
//! and the structured [`MappingTable`](mapjoin_types::MappingTable). The codec
//! is pure and stateless.
//!
//! # Format
//!
//! - `;` separates generated lines, `,` separates segments within a line.
//! - Each segment is 1, 4 or 5 base64 VLQ deltas.
//! - The generated column delta restarts at every line; source index, source
//!   line, source column and name index deltas run across the whole string.
//!
//! Any byte outside the 64-symbol alphabet and the two separators is a
//! [`CodecError`].

pub mod error;
pub mod mappings;
pub mod vlq;

pub use error::{CodecError, CodecResult};
pub use mappings::{decode, encode};
pub use vlq::{decode_vlq, encode_vlq};
