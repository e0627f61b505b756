//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use jg_extract::ExtractionPolicy;
use std::path::PathBuf;

/// Joingraph - extract table join graphs from SQL files
#[derive(Parser, Debug)]
#[command(name = "jg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// SQL dialect used for parsing
    #[arg(short, long, global = true, default_value = "generic")]
    pub dialect: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract join edges from SQL files
    Extract(ExtractArgs),

    /// Count JOIN keywords in SQL files without parsing
    Count(CountArgs),
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// SQL files to analyze
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Path of the CSV report
    #[arg(short, long, default_value = "joins_result.csv")]
    pub output: PathBuf,

    /// Extraction policy
    #[arg(short, long, value_enum, default_value = "conservative")]
    pub policy: PolicyArg,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Emit the legacy localized report header
    #[arg(long)]
    pub legacy_header: bool,
}

/// Arguments for the count command
#[derive(Args, Debug)]
pub struct CountArgs {
    /// SQL files to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Extraction policy flag
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyArg {
    /// Expand every CTE usage site down to base tables
    Exhaustive,
    /// Skip joins touching join-bearing CTEs to avoid double-counting
    Conservative,
}

impl From<PolicyArg> for ExtractionPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Exhaustive => ExtractionPolicy::Exhaustive,
            PolicyArg::Conservative => ExtractionPolicy::Conservative,
        }
    }
}

/// Report output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Semicolon-delimited report written to the output file
    Csv,
    /// JSON edge list on stdout
    Json,
    /// Human-readable listing on stdout
    Pretty,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
