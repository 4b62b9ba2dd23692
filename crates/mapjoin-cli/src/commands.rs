use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use mapjoin_merge::{MergeConfig, MergeEngine, MergeReport};
use mapjoin_store::FsStorage;
use mapjoin_types::{MappingTable, SourceMapDocument};

use crate::cli::*;

const DEFAULT_CONFIG_FILE: &str = "mapjoin.toml";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args, &cli.format),
        Command::Decode(args) => {
            println!("{}", decode_map_file(&args.map)?);
            Ok(())
        }
        Command::Encode(args) => {
            println!("{}", encode_table_file(&args.table)?);
            Ok(())
        }
    }
}

fn cmd_merge(args: MergeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let engine = MergeEngine::new(Arc::new(FsStorage::new()), config);
    let report = engine.merge_project(&args.root)?;

    match format {
        OutputFormat::Json => println!("{}", report_json(&report)),
        OutputFormat::Text => print_report(&report),
    }
    Ok(())
}

/// Resolve the merge config: explicit `--config`, else `<root>/mapjoin.toml`
/// if present, else defaults; then apply flag overrides.
pub fn build_config(args: &MergeArgs) -> anyhow::Result<MergeConfig> {
    let mut config = match &args.config {
        Some(path) => MergeConfig::load(path)?,
        None => {
            let implicit = args.root.join(DEFAULT_CONFIG_FILE);
            if implicit.is_file() {
                MergeConfig::load(&implicit)?
            } else {
                MergeConfig::default()
            }
        }
    };

    if let Some(manifest) = &args.manifest {
        config.manifest_file = manifest.clone();
    }
    if let Some(key) = &args.key {
        config.manifest_key = key.clone();
    }
    if let Some(dir) = &args.out_dir {
        config.output_dir = dir.clone();
    }
    if let Some(file) = &args.out_file {
        config.output_file = file.clone();
    }
    Ok(config)
}

fn print_report(report: &MergeReport) {
    for skipped in &report.skipped {
        println!("  {} {} ({})", "skipped:".yellow(), skipped.path, skipped.reason);
    }
    if !report.wrote_output() {
        println!("{} nothing to merge", "✗".red().bold());
        return;
    }
    println!(
        "{} merged {} files ({} skipped)",
        "✓".green().bold(),
        report.merged.to_string().bold(),
        report.skipped.len()
    );
    if let Some(path) = &report.script_path {
        println!("  script: {}", path.display().to_string().cyan());
    }
    if let Some(path) = &report.map_path {
        println!("  map:    {}", path.display().to_string().cyan());
    }
}

fn report_json(report: &MergeReport) -> serde_json::Value {
    serde_json::json!({
        "merged": report.merged,
        "skipped": report
            .skipped
            .iter()
            .map(|s| serde_json::json!({ "path": s.path, "reason": s.reason.to_string() }))
            .collect::<Vec<_>>(),
        "sources": report.sources,
        "script": report.script_path.as_ref().map(|p| p.display().to_string()),
        "map": report.map_path.as_ref().map(|p| p.display().to_string()),
    })
}

/// Decode the `mappings` of a map file into pretty-printed table JSON.
pub fn decode_map_file(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let doc = SourceMapDocument::from_json_str(&text)?;
    let table = mapjoin_codec::decode(&doc.mappings)
        .with_context(|| format!("decoding mappings of {}", path.display()))?;
    Ok(serde_json::to_string_pretty(&table)?)
}

/// Encode a JSON mapping table file into a `mappings` string.
pub fn encode_table_file(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let table: MappingTable = serde_json::from_str(&text)
        .with_context(|| format!("parsing mapping table {}", path.display()))?;
    Ok(mapjoin_codec::encode(&table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn merge_args(root: &Path) -> MergeArgs {
        MergeArgs {
            root: root.to_path_buf(),
            config: None,
            manifest: None,
            key: None,
            out_dir: None,
            out_file: None,
        }
    }

    #[test]
    fn config_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = build_config(&merge_args(dir.path())).unwrap();
        assert_eq!(config, MergeConfig::default());
    }

    #[test]
    fn config_reads_implicit_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "output_file = \"bundle.js\"\nmanifest_key = \"modules\"\n",
        )
        .unwrap();
        let mut args = merge_args(dir.path());
        args.key = Some("game".to_string());
        args.out_dir = Some(PathBuf::from("out"));

        let config = build_config(&args).unwrap();
        assert_eq!(config.output_file, "bundle.js");
        assert_eq!(config.manifest_key, "game");
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn explicit_missing_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = merge_args(dir.path());
        args.config = Some(dir.path().join("nope.toml"));
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn decode_then_encode() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("main.js.map");
        std::fs::write(
            &map,
            r#"{"version":3,"sources":["a.ts"],"names":[],"mappings":"AAAA;AACA,IAAI"}"#,
        )
        .unwrap();

        let json = decode_map_file(&map).unwrap();
        let table: MappingTable = serde_json::from_str(&json).unwrap();
        assert_eq!(table.len(), 2);

        let table_file = dir.path().join("table.json");
        std::fs::write(&table_file, &json).unwrap();
        assert_eq!(encode_table_file(&table_file).unwrap(), "AAAA;AACA,IAAI");
    }

    #[test]
    fn decode_rejects_bad_alphabet() {
        let dir = tempfile::tempdir().unwrap();
        let map = dir.path().join("bad.map");
        std::fs::write(&map, r##"{"version":3,"sources":[],"mappings":"#"}"##).unwrap();
        assert!(decode_map_file(&map).is_err());
    }

    #[test]
    fn report_json_shape() {
        let report = MergeReport {
            merged: 1,
            sources: vec!["A.ts".to_string()],
            script_path: Some(PathBuf::from("dist/main.js")),
            map_path: Some(PathBuf::from("dist/main.js.map")),
            ..Default::default()
        };
        let v = report_json(&report);
        assert_eq!(v["merged"], 1);
        assert_eq!(v["sources"][0], "A.ts");
        assert_eq!(v["script"], "dist/main.js");
        assert!(v["skipped"].as_array().unwrap().is_empty());
    }
}
