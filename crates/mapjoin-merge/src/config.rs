use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, MergeResult};

/// Configuration for a merge run.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Manifest file, relative to the project root.
    pub manifest_file: PathBuf,
    /// Key in the manifest object that lists the scripts to merge.
    pub manifest_key: String,
    /// Output directory, relative to the project root.
    pub output_dir: PathBuf,
    /// File name of the merged script; the map is this name plus `.map`.
    pub output_file: String,
    /// Statement written at the very start of the merged script.
    pub prologue: String,
    /// Statement written after the trailing map reference.
    pub global_binding: String,
    /// `sourceRoot` of the merged map.
    pub source_root: String,
    /// Extension of compiled scripts, without the dot.
    pub script_extension: String,
    /// Extension of the original sources listed in the merged map.
    pub source_extension: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            manifest_file: PathBuf::from("manifest.json"),
            manifest_key: "game".to_string(),
            output_dir: PathBuf::from("dist"),
            output_file: "main.js".to_string(),
            prologue: "var egret = window.egret;".to_string(),
            global_binding: "window.Main = Main;".to_string(),
            source_root: "../src/".to_string(),
            script_extension: "js".to_string(),
            source_extension: "ts".to_string(),
        }
    }
}

impl MergeConfig {
    /// Parse a TOML config. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> MergeResult<Self> {
        toml::from_str(s).map_err(|e| MergeError::Config(e.to_string()))
    }

    /// Load a TOML config from disk.
    pub fn load(path: &Path) -> MergeResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| MergeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// File name of the merged map.
    pub fn map_file(&self) -> String {
        format!("{}.map", self.output_file)
    }
}
