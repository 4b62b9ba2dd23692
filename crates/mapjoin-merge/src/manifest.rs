use std::path::Path;

use mapjoin_store::Storage;
use serde_json::Value;

use crate::error::{MergeError, MergeResult};

/// Ordered list of compiled scripts to merge.
///
/// Read from a JSON object whose configured key holds an array of script
/// paths, e.g. `{"game": ["bin-debug/A.js", "bin-debug/B.js"]}`. Order is
/// significant and preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    pub entries: Vec<String>,
}

impl Manifest {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    /// Parse manifest JSON, taking the script list from `key`.
    pub fn from_json_str(s: &str, key: &str) -> MergeResult<Self> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| MergeError::Manifest(e.to_string()))?;
        let list = value
            .get(key)
            .ok_or_else(|| MergeError::Manifest(format!("missing key {key:?}")))?
            .as_array()
            .ok_or_else(|| MergeError::Manifest(format!("{key:?} is not an array")))?;

        let entries = list
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    MergeError::Manifest(format!("{key}[{i}] is not a string"))
                })
            })
            .collect::<MergeResult<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Load a manifest through storage.
    pub fn load(storage: &dyn Storage, path: &Path, key: &str) -> MergeResult<Self> {
        let text = storage.read_text(path);
        if text.is_empty() {
            return Err(MergeError::Manifest(format!(
                "{} is missing or empty",
                path.display()
            )));
        }
        Self::from_json_str(&text, key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
