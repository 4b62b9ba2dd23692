use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mapjoin_codec as codec;
use mapjoin_store::{path as upath, Storage};
use mapjoin_types::SourceMapDocument;
use tracing::{debug, info, warn};

use crate::carry::MergeCarry;
use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::manifest::Manifest;

/// Marker that starts the embedded map reference line of a compiled script.
pub const SOURCE_MAPPING_MARKER: &str = "//# sourceMappingURL=";

/// Why an input file contributed nothing to the merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The script has no `//# sourceMappingURL=` line (or could not be read).
    MissingMarker,
    /// The adjacent `.map` could not be read or parsed.
    UnreadableMap(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMarker => write!(f, "no sourceMappingURL marker"),
            Self::UnreadableMap(reason) => write!(f, "unreadable source map: {reason}"),
        }
    }
}

/// A manifest entry that was skipped, with the reason.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: String,
    pub reason: SkipReason,
}

/// Outcome of a merge run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Number of files that contributed to the output.
    pub merged: usize,
    /// Files that were skipped, in manifest order.
    pub skipped: Vec<SkippedFile>,
    /// Consolidated `sources` list written to the merged map.
    pub sources: Vec<String>,
    /// Path of the merged script, if one was written.
    pub script_path: Option<PathBuf>,
    /// Path of the merged map, if one was written.
    pub map_path: Option<PathBuf>,
}

impl MergeReport {
    /// Returns `true` if output files were written.
    pub fn wrote_output(&self) -> bool {
        self.script_path.is_some()
    }
}

/// One compiled script after processing: its truncated text and rebased
/// mapping fragment.
struct Contribution {
    source: String,
    text: String,
    fragment: String,
}

enum FileOutcome {
    Merged(Contribution),
    Skipped(SkipReason),
}

/// Accumulated state of a single merge run.
///
/// Owned by one call to [`MergeEngine::merge`] and threaded through the
/// files strictly in manifest order.
struct MergeRun {
    carry: MergeCarry,
    script: String,
    sources: Vec<String>,
    fragments: Vec<String>,
    skipped: Vec<SkippedFile>,
}

/// Merges compiled scripts and their source maps into one script and one map.
///
/// All file access goes through the injected [`Storage`]. Outputs are written
/// only after every input has been processed, so a fatal error leaves no
/// partial output behind.
pub struct MergeEngine {
    storage: Arc<dyn Storage>,
    config: MergeConfig,
}

impl fmt::Debug for MergeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergeEngine")
            .field("config", &self.config)
            .finish()
    }
}

impl MergeEngine {
    pub fn new(storage: Arc<dyn Storage>, config: MergeConfig) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Load the manifest under `root` and merge the files it lists.
    pub fn merge_project(&self, root: &Path) -> MergeResult<MergeReport> {
        let manifest_path = root.join(&self.config.manifest_file);
        let manifest = Manifest::load(
            self.storage.as_ref(),
            &manifest_path,
            &self.config.manifest_key,
        )?;
        info!(
            manifest = %manifest_path.display(),
            entries = manifest.len(),
            "loaded manifest"
        );
        self.merge(root, &manifest.entries)
    }

    /// Merge `entries` (script paths relative to `root`) in order.
    pub fn merge(&self, root: &Path, entries: &[String]) -> MergeResult<MergeReport> {
        let mut run = MergeRun {
            carry: MergeCarry::new(),
            script: self.config.prologue.clone(),
            sources: Vec::new(),
            fragments: Vec::new(),
            skipped: Vec::new(),
        };

        for entry in entries {
            match self.process_file(root, entry, &mut run.carry, run.sources.len())? {
                FileOutcome::Merged(c) => {
                    run.sources.push(c.source);
                    run.fragments.push(c.fragment);
                    run.script.push_str(&c.text);
                }
                FileOutcome::Skipped(reason) => {
                    warn!(path = %entry, %reason, "skipping file");
                    run.skipped.push(SkippedFile {
                        path: entry.clone(),
                        reason,
                    });
                }
            }
        }

        let mut report = MergeReport {
            merged: run.fragments.len(),
            skipped: run.skipped,
            ..Default::default()
        };

        if report.merged > 0 {
            let (script_path, map_path) =
                self.write_outputs(root, run.script, &run.sources, &run.fragments)?;
            report.script_path = Some(script_path);
            report.map_path = Some(map_path);
        }
        report.sources = run.sources;

        info!(
            merged = report.merged,
            skipped = report.skipped.len(),
            "merge complete"
        );
        Ok(report)
    }

    fn process_file(
        &self,
        root: &Path,
        entry: &str,
        carry: &mut MergeCarry,
        target_index: usize,
    ) -> MergeResult<FileOutcome> {
        let script_path = root.join(entry);
        let content = self.storage.read_text(&script_path);
        let Some(marker_at) = content.find(SOURCE_MAPPING_MARKER) else {
            return Ok(FileOutcome::Skipped(SkipReason::MissingMarker));
        };

        let mut map_path = script_path.clone().into_os_string();
        map_path.push(".map");
        let map_path = PathBuf::from(map_path);
        let map_text = self.storage.read_text(&map_path);
        if map_text.is_empty() {
            return Ok(FileOutcome::Skipped(SkipReason::UnreadableMap(
                "missing or empty".to_string(),
            )));
        }
        let doc = match SourceMapDocument::from_json_str(&map_text) {
            Ok(doc) => doc,
            Err(e) => return Ok(FileOutcome::Skipped(SkipReason::UnreadableMap(e.to_string()))),
        };
        if doc.sources.len() > 1 {
            warn!(
                path = %entry,
                sources = doc.sources.len(),
                "map lists several sources; merging as a single source"
            );
        }

        let mut table = codec::decode(&doc.mappings).map_err(|source| MergeError::Format {
            path: map_path.clone(),
            source,
        })?;
        debug!(
            path = %entry,
            lines = table.len(),
            segments = table.segment_count(),
            "decoded source map"
        );

        let target_index = i32::try_from(target_index)
            .map_err(|_| MergeError::Manifest("too many files to merge".to_string()))?;
        carry
            .rebase(&mut table, target_index)
            .map_err(|source| MergeError::Format {
                path: map_path.clone(),
                source,
            })?;

        Ok(FileOutcome::Merged(Contribution {
            source: self.source_name(entry),
            text: content[..marker_at].to_string(),
            fragment: codec::encode(&table),
        }))
    }

    /// Name under which a script's original source appears in the merged
    /// map: leading path segment stripped, script extension replaced by the
    /// source extension.
    pub fn source_name(&self, entry: &str) -> String {
        let unix = upath::to_unix(entry);
        upath::replace_extension(
            upath::strip_first_segment(&unix),
            &self.config.script_extension,
            &self.config.source_extension,
        )
    }

    fn write_outputs(
        &self,
        root: &Path,
        mut script: String,
        sources: &[String],
        fragments: &[String],
    ) -> MergeResult<(PathBuf, PathBuf)> {
        let out_dir = root.join(&self.config.output_dir);
        let map_file = self.config.map_file();
        let script_path = out_dir.join(&self.config.output_file);
        let map_path = out_dir.join(&map_file);

        script.push_str(SOURCE_MAPPING_MARKER);
        script.push_str(&map_file);
        script.push_str("\n;");
        script.push_str(&self.config.global_binding);

        let doc = SourceMapDocument::new(
            self.config.output_file.clone(),
            self.config.source_root.clone(),
            sources.to_vec(),
            fragments.join(";"),
        );
        let map_json = doc
            .to_json_string()
            .map_err(|e| MergeError::Serialization(e.to_string()))?;

        self.storage.write_file(&script_path, script.as_bytes())?;
        self.storage.write_file(&map_path, map_json.as_bytes())?;
        debug!(
            script = %script_path.display(),
            map = %map_path.display(),
            "wrote merged outputs"
        );
        Ok((script_path, map_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapjoin_store::{FsStorage, InMemoryStorage};

    const ROOT: &str = "proj";

    fn script(body: &str, name: &str) -> String {
        format!("{body}{SOURCE_MAPPING_MARKER}{name}.map\n")
    }

    fn map(source: &str, mappings: &str) -> String {
        format!(
            r#"{{"version":3,"file":"x.js","sourceRoot":"","sources":["{source}"],"names":[],"mappings":"{mappings}"}}"#
        )
    }

    /// Store holding `bin-debug/<name>.js` and its map for each entry.
    fn project(files: &[(&str, &str, &str)]) -> Arc<InMemoryStorage> {
        let store = Arc::new(InMemoryStorage::new());
        for (name, body, mappings) in files {
            store.insert(
                format!("{ROOT}/bin-debug/{name}.js"),
                script(body, name),
            );
            store.insert(
                format!("{ROOT}/bin-debug/{name}.js.map"),
                map(&format!("../src/{name}.ts"), mappings),
            );
        }
        store
    }

    fn entries(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| format!("bin-debug/{n}.js")).collect()
    }

    fn engine(store: &Arc<InMemoryStorage>) -> MergeEngine {
        MergeEngine::new(store.clone(), MergeConfig::default())
    }

    fn output_map(store: &InMemoryStorage) -> SourceMapDocument {
        let text = store.read_text(Path::new("proj/dist/main.js.map"));
        SourceMapDocument::from_json_str(&text).unwrap()
    }

    #[test]
    fn merges_two_files_in_order() {
        let store = project(&[
            ("A", "var A = 1;\n", "AAAA"),
            ("B", "var B = 2;\n", "AAAA"),
        ]);
        let report = engine(&store)
            .merge(Path::new(ROOT), &entries(&["A", "B"]))
            .unwrap();

        assert_eq!(report.merged, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.sources, vec!["A.ts", "B.ts"]);
        assert_eq!(report.script_path, Some(PathBuf::from("proj/dist/main.js")));
        assert_eq!(report.map_path, Some(PathBuf::from("proj/dist/main.js.map")));

        let merged = store.read_text(Path::new("proj/dist/main.js"));
        assert_eq!(
            merged,
            "var egret = window.egret;var A = 1;\nvar B = 2;\n\
             //# sourceMappingURL=main.js.map\n;window.Main = Main;"
        );

        let doc = output_map(&store);
        assert_eq!(doc.version, 3);
        assert_eq!(doc.file, "main.js");
        assert_eq!(doc.source_root, "../src/");
        assert_eq!(doc.sources, vec!["A.ts", "B.ts"]);
        assert!(doc.names.is_empty());
        assert_eq!(doc.mappings, "AAAA;ACAA");
    }

    #[test]
    fn rebased_mappings_resolve_to_original_positions() {
        let store = project(&[
            ("A", "a0\na1\n", "AAAA;AACA,IAAI"),
            ("B", "b0\nb1\n", "AAAA;AACE"),
            ("C", "c0\n", "AAEC"),
        ]);
        engine(&store)
            .merge(Path::new(ROOT), &entries(&["A", "B", "C"]))
            .unwrap();

        let merged = codec::decode(&output_map(&store).mappings).unwrap();
        let positions: Vec<Vec<(i32, i32, i32)>> = merged
            .lines()
            .iter()
            .map(|line| line.iter().filter_map(|s| s.source()).collect())
            .collect();
        assert_eq!(
            positions,
            vec![
                vec![(0, 0, 0)],
                vec![(0, 1, 0), (0, 1, 4)],
                vec![(1, 0, 0)],
                vec![(1, 1, 2)],
                vec![(2, 2, 1)],
            ]
        );
    }

    #[test]
    fn named_segments_lose_names() {
        let store = project(&[("A", "a\n", "AAAAA")]);
        engine(&store).merge(Path::new(ROOT), &entries(&["A"])).unwrap();
        assert_eq!(output_map(&store).mappings, "AAAA");
    }

    #[test]
    fn file_without_marker_is_skipped() {
        let store = project(&[("A", "a\n", "AAAA"), ("B", "b\n", "AAAA")]);
        store.insert("proj/bin-debug/Plain.js", "var plain;\n");
        let report = engine(&store)
            .merge(Path::new(ROOT), &entries(&["A", "Plain", "B"]))
            .unwrap();

        assert_eq!(report.merged, 2);
        assert_eq!(
            report.skipped,
            vec![SkippedFile {
                path: "bin-debug/Plain.js".to_string(),
                reason: SkipReason::MissingMarker,
            }]
        );
        let merged = store.read_text(Path::new("proj/dist/main.js"));
        assert!(!merged.contains("plain"));
        assert_eq!(output_map(&store).sources, vec!["A.ts", "B.ts"]);
    }

    #[test]
    fn missing_script_is_skipped() {
        let store = project(&[("A", "a\n", "AAAA")]);
        let report = engine(&store)
            .merge(Path::new(ROOT), &entries(&["Nope", "A"]))
            .unwrap();
        assert_eq!(report.merged, 1);
        assert_eq!(report.skipped[0].reason, SkipReason::MissingMarker);
    }

    #[test]
    fn unreadable_map_is_skipped() {
        let store = project(&[("A", "a\n", "AAAA")]);
        store.insert("proj/bin-debug/B.js", script("b\n", "B"));
        store.insert("proj/bin-debug/C.js", script("c\n", "C"));
        store.insert("proj/bin-debug/C.js.map", "{not json");
        let report = engine(&store)
            .merge(Path::new(ROOT), &entries(&["A", "B", "C"]))
            .unwrap();

        assert_eq!(report.merged, 1);
        assert_eq!(report.skipped.len(), 2);
        assert!(report
            .skipped
            .iter()
            .all(|s| matches!(s.reason, SkipReason::UnreadableMap(_))));
    }

    #[test]
    fn empty_manifest_writes_nothing() {
        let store = project(&[]);
        let report = engine(&store).merge(Path::new(ROOT), &[]).unwrap();
        assert_eq!(report.merged, 0);
        assert!(!report.wrote_output());
        assert!(store.is_empty());
    }

    #[test]
    fn no_markers_writes_nothing() {
        let store = Arc::new(InMemoryStorage::new());
        store.insert("proj/bin-debug/A.js", "var a;");
        store.insert("proj/bin-debug/B.js", "var b;");
        let report = engine(&store)
            .merge(Path::new(ROOT), &entries(&["A", "B"]))
            .unwrap();
        assert_eq!(report.merged, 0);
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(store.len(), 2);
        assert!(!store.exists(Path::new("proj/dist")));
    }

    #[test]
    fn bad_mapping_character_aborts_without_output() {
        let store = project(&[("A", "a\n", "AAAA"), ("B", "b\n", "AA#A")]);
        let err = engine(&store)
            .merge(Path::new(ROOT), &entries(&["A", "B"]))
            .unwrap_err();

        match err {
            MergeError::Format { path, source } => {
                assert_eq!(path, PathBuf::from("proj/bin-debug/B.js.map"));
                assert_eq!(
                    source,
                    codec::CodecError::InvalidCharacter { ch: '#', offset: 2 }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!store.exists(Path::new("proj/dist")));
    }

    #[test]
    fn rebase_overflow_aborts_without_output() {
        let mut huge = String::from("AA");
        codec::encode_vlq(i64::from(i32::MAX), &mut huge);
        huge.push('A');
        let store = project(&[("A", "a\n", huge.as_str()), ("B", "b\n", "AAFA")]);

        let err = engine(&store)
            .merge(Path::new(ROOT), &entries(&["A", "B"]))
            .unwrap_err();
        match err {
            MergeError::Format { path, source } => {
                assert_eq!(path, PathBuf::from("proj/bin-debug/B.js.map"));
                assert_eq!(source, codec::CodecError::RebaseOutOfRange { line: 0 });
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!store.exists(Path::new("proj/dist/main.js")));
        assert!(!store.exists(Path::new("proj/dist/main.js.map")));
    }

    #[test]
    fn multi_source_map_merges_as_one_source() {
        let store = project(&[("A", "a\n", "AAAA")]);
        store.insert(format!("{ROOT}/bin-debug/M.js"), script("m\n", "M"));
        store.insert(
            format!("{ROOT}/bin-debug/M.js.map"),
            r#"{"version":3,"sources":["a.ts","b.ts"],"names":[],"mappings":"AAAA,EACA"}"#,
        );

        let report = engine(&store)
            .merge(Path::new(ROOT), &entries(&["A", "M"]))
            .unwrap();
        assert_eq!(report.merged, 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.sources, vec!["A.ts", "M.ts"]);

        let doc = output_map(&store);
        assert_eq!(doc.sources, vec!["A.ts", "M.ts"]);
        let merged = codec::decode(&doc.mappings).unwrap();
        let m_indices: Vec<i32> = merged.lines()[1]
            .iter()
            .filter_map(|s| s.source())
            .map(|(index, _, _)| index)
            .collect();
        assert_eq!(m_indices, vec![1, 1]);
    }

    #[test]
    fn merge_project_reads_manifest() {
        let store = project(&[("A", "a\n", "AAAA"), ("B", "b\n", "AAAA")]);
        store.insert(
            "proj/manifest.json",
            r#"{"initial":["libs/x.js"],"game":["bin-debug/B.js","bin-debug/A.js"]}"#,
        );
        let report = engine(&store).merge_project(Path::new(ROOT)).unwrap();
        assert_eq!(report.sources, vec!["B.ts", "A.ts"]);
    }

    #[test]
    fn custom_output_config() {
        let store = project(&[("A", "a\n", "AAAA")]);
        let config = MergeConfig {
            output_dir: PathBuf::from("out"),
            output_file: "bundle.js".to_string(),
            prologue: String::new(),
            global_binding: String::new(),
            ..Default::default()
        };
        let engine = MergeEngine::new(store.clone(), config);
        engine.merge(Path::new(ROOT), &entries(&["A"])).unwrap();

        assert_eq!(
            store.read_text(Path::new("proj/out/bundle.js")),
            "a\n//# sourceMappingURL=bundle.js.map\n;"
        );
        assert!(store.is_file(Path::new("proj/out/bundle.js.map")));
    }

    #[test]
    fn source_name_rewrites_path() {
        let store = project(&[]);
        let engine = engine(&store);
        assert_eq!(engine.source_name("bin-debug/ui/Panel.js"), "ui/Panel.ts");
        assert_eq!(engine.source_name(r"bin-debug\Main.js"), "Main.ts");
        assert_eq!(engine.source_name("Main.js"), "Main.ts");
    }

    #[test]
    fn merges_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("bin-debug")).unwrap();
        std::fs::write(root.join("bin-debug/A.js"), script("var A;\n", "A")).unwrap();
        std::fs::write(root.join("bin-debug/A.js.map"), map("A.ts", "AAAA")).unwrap();
        std::fs::write(root.join("manifest.json"), r#"{"game":["bin-debug/A.js"]}"#).unwrap();

        let engine = MergeEngine::new(Arc::new(FsStorage::new()), MergeConfig::default());
        let report = engine.merge_project(root).unwrap();
        assert_eq!(report.merged, 1);

        let merged = std::fs::read_to_string(root.join("dist/main.js")).unwrap();
        assert!(merged.starts_with("var egret = window.egret;var A;\n"));
        assert!(merged.ends_with(";window.Main = Main;"));
        let doc = SourceMapDocument::from_json_str(
            &std::fs::read_to_string(root.join("dist/main.js.map")).unwrap(),
        )
        .unwrap();
        assert_eq!(doc.sources, vec!["A.ts"]);
        assert_eq!(doc.mappings, "AAAA");
    }
}
