//! Foundation types for mapjoin.
//!
//! This crate provides the structured form of a version-3 source map that the
//! rest of the workspace operates on. Every other mapjoin crate depends on
//! `mapjoin-types`.
//!
//! # Key Types
//!
//! - [`Segment`] — One mapped position: generated-only, with source, or with source and name
//! - [`Line`] — Segments of one generated line, in encounter order
//! - [`MappingTable`] — All lines of a map; index is the generated line number
//! - [`SourceMapDocument`] — The JSON document `{version, file, sourceRoot, sources, names, mappings}`

pub mod document;
pub mod error;
pub mod segment;
pub mod table;

pub use document::{SourceMapDocument, SOURCE_MAP_VERSION};
pub use error::{TypeError, TypeResult};
pub use segment::Segment;
pub use table::{Line, MappingTable};
