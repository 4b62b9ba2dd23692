//! Merge engine for mapjoin.
//!
//! Concatenates compiled scripts listed in a manifest into one bundle and
//! splices their per-file source maps into a single consolidated map, so
//! positions in the bundle still resolve to the original per-module sources.
//!
//! For each file, in manifest order:
//!
//! 1. Read the script and cut it at its `//# sourceMappingURL=` marker.
//!    Files without the marker are skipped.
//! 2. Read and decode the adjacent `.map`. Unreadable maps are skipped;
//!    malformed `mappings` abort the whole run.
//! 3. Rebase the decoded table against the [`MergeCarry`] left by the
//!    previous file, then advance the carry.
//! 4. Re-encode the table and append script text, source name, and mapping
//!    fragment to the run's buffers.
//!
//! Outputs are written once, after all files, and only if at least one file
//! contributed.

pub mod carry;
pub mod config;
pub mod engine;
pub mod error;
pub mod manifest;

pub use carry::MergeCarry;
pub use config::MergeConfig;
pub use engine::{MergeEngine, MergeReport, SkipReason, SkippedFile, SOURCE_MAPPING_MARKER};
pub use error::{MergeError, MergeResult};
pub use manifest::Manifest;
