//! Storage collaborator for mapjoin.
//!
//! The merge engine never touches the filesystem directly. It reads scripts
//! and maps and writes its two outputs through the [`Storage`] trait.
//!
//! # Backends
//!
//! - [`FsStorage`] — the real filesystem, with a per-instance text memo cache
//! - [`InMemoryStorage`] — map-backed store for tests and embedding
//!
//! # Rules
//!
//! 1. Reads never error: unreadable text is `""`, unreadable bytes are `None`.
//! 2. Writes create all parent directories first, then write the file.
//! 3. Paths are handled with forward slashes on every platform.

pub mod error;
pub mod fs;
pub mod memory;
pub mod path;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::{FsStorage, DEFAULT_CACHE_EXTENSIONS};
pub use memory::InMemoryStorage;
pub use traits::Storage;
