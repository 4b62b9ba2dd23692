use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mapjoin",
    about = "mapjoin: merge compiled scripts and their source maps into one bundle",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge the scripts listed in the manifest into one script and map
    Merge(MergeArgs),
    /// Decode a source map's mappings and print the table as JSON
    Decode(DecodeArgs),
    /// Encode a JSON mapping table into a mappings string
    Encode(EncodeArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Project root containing the manifest
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// TOML config file (defaults to <root>/mapjoin.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Manifest file, relative to the root
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    /// Manifest key listing the scripts
    #[arg(long)]
    pub key: Option<String>,
    /// Output directory, relative to the root
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Merged script file name
    #[arg(long)]
    pub out_file: Option<String>,
}

#[derive(Args)]
pub struct DecodeArgs {
    /// Source map file to decode
    pub map: PathBuf,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// JSON file holding a mapping table (`[[[0,0,0,0], ...], ...]`)
    pub table: PathBuf,
}
