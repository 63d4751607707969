//! Command-line interface definitions for entrycache.
//!
//! # Example
//!
//! ```bash
//! # Show what changed since the last committed snapshot
//! entrycache diff . --entries-root pages
//!
//! # Compute the diff, then persist the snapshot (after a successful build)
//! entrycache diff . --entries-root pages --commit
//!
//! # Narrow a declared input set to the affected entries
//! entrycache plan . --entries-root pages --input x=pages/x/main.ts --input y=pages/y/main.ts
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Incremental rebuild detection via content-fingerprint snapshots.
///
/// entrycache fingerprints the files under a public root and the entry
/// directories under an entries root, diffs them against the previous run,
/// and tells the build tool what actually needs rebuilding.
#[derive(Debug, Parser)]
#[command(name = "entrycache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Emit errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for entrycache.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute and print the snapshot diff against the cached prior run
    Diff(DiffArgs),
    /// Derive a restricted build-input set from the diff
    Plan(PlanArgs),
}

/// Options shared by every snapshot-computing subcommand.
#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Public root directory to fingerprint
    #[arg(value_name = "ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Entries root whose immediate subdirectories are build entry points,
    /// relative to ROOT
    #[arg(short, long, value_name = "DIR")]
    pub entries_root: PathBuf,

    /// Path to the snapshot cache file
    ///
    /// Defaults to .entrycache/snapshots.json under ROOT.
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Glob patterns to exclude (can be specified multiple times)
    ///
    /// These are added to any .gitignore patterns found in ROOT.
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Include hidden files in the public walk
    #[arg(long)]
    pub hidden: bool,

    /// Number of digest worker threads (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N", default_value = "4")]
    pub io_threads: usize,
}

/// Arguments for the diff subcommand.
#[derive(Debug, Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Persist the computed snapshots after printing the diff
    ///
    /// Only do this once the consuming build has succeeded; a committed
    /// snapshot marks its changes as built.
    #[arg(long)]
    pub commit: bool,
}

/// Arguments for the plan subcommand.
#[derive(Debug, Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Declared build input as alias=path (can be specified multiple times,
    /// declaration order matters)
    #[arg(short, long = "input", value_name = "ALIAS=PATH", value_parser = parse_input_pair)]
    pub inputs: Vec<(String, PathBuf)>,

    /// Read the declared build input from a JSON file instead
    ///
    /// Accepts a string, an array of strings, or an alias-to-path object.
    #[arg(long, value_name = "FILE", conflicts_with = "inputs")]
    pub input_json: Option<PathBuf>,
}

/// Output format for the diff subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Machine-readable JSON
    Json,
}

/// Parse an `alias=path` pair.
fn parse_input_pair(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((alias, path)) if !alias.is_empty() && !path.is_empty() => {
            Ok((alias.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected ALIAS=PATH, got '{raw}'")),
    }
}
