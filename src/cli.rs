//! CLI argument parsing for tracefold

use crate::operation::OperationKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tracefold")]
#[command(version)]
#[command(about = "Consolidate read/write operation logs into higher-level operations", long_about = None)]
pub struct Cli {
    /// Operation log to consolidate (JSON array); reads stdin when omitted
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Pattern kind to activate (repeatable, overrides the config file)
    #[arg(short = 'p', long = "pattern", value_name = "KIND", value_parser = parse_kind)]
    pub patterns: Vec<OperationKind>,

    /// TOML configuration file (default: built-in, swap enabled)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the consolidated log to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Print a consolidation summary to stderr
    #[arg(long = "stats")]
    pub stats: bool,

    /// List active patterns and exit
    #[arg(long = "list-patterns")]
    pub list_patterns: bool,

    /// Enable debug tracing output (to stderr)
    #[arg(long = "debug")]
    pub debug: bool,
}

fn parse_kind(s: &str) -> Result<OperationKind, String> {
    s.parse().map_err(|e: crate::error::ConsolidationError| e.to_string())
}
