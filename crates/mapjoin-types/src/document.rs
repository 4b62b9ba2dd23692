use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};

/// The only source map revision mapjoin reads or writes.
pub const SOURCE_MAP_VERSION: u32 = 3;

/// A version-3 source map document.
///
/// Keys are camelCase on the wire. `file`, `sourceRoot` and `names` may be
/// absent in input; unknown keys (e.g. `sourcesContent`) are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapDocument {
    pub version: u32,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub source_root: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub names: Vec<String>,
    pub mappings: String,
}

impl SourceMapDocument {
    /// A version-3 document with no names.
    pub fn new(
        file: impl Into<String>,
        source_root: impl Into<String>,
        sources: Vec<String>,
        mappings: impl Into<String>,
    ) -> Self {
        Self {
            version: SOURCE_MAP_VERSION,
            file: file.into(),
            source_root: source_root.into(),
            sources,
            names: Vec::new(),
            mappings: mappings.into(),
        }
    }

    pub fn from_json_str(s: &str) -> TypeResult<Self> {
        serde_json::from_str(s).map_err(|e| TypeError::Json(e.to_string()))
    }

    pub fn to_json_string(&self) -> TypeResult<String> {
        serde_json::to_string(self).map_err(|e| TypeError::Json(e.to_string()))
    }
}
