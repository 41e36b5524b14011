//! CLI argument definitions for the roster search tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use roster_cli::pagination::DEFAULT_PER_PAGE;

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Search tabular rosters by identifier or by Arabic-aware fuzzy name",
    long_about = "Load a CSV roster, detect its identifier and name columns, and \
                  look records up by exact or partial identifier, or by name with \
                  spelling-tolerant, word-order-insensitive matching."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow queries and record values to appear in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show detected identifier and name columns.
    Columns(LoadArgs),

    /// Search a roster by identifier or name.
    Search(SearchArgs),

    /// Print the first records of a roster.
    Preview(PreviewArgs),

    /// List tabular files in a directory.
    Files(FilesArgs),

    /// Interactive session: load once, query many times.
    Shell(ShellArgs),
}

/// Input file and load limits shared by every command that reads a roster.
#[derive(Args)]
pub struct LoadArgs {
    /// Path to the roster CSV file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Read at most this many data rows.
    ///
    /// Without this flag, files larger than 25 MiB are capped at 50,000 rows.
    #[arg(long = "max-rows", value_name = "N")]
    pub max_rows: Option<usize>,
}

#[derive(Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Text to search for.
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Which column to search.
    #[arg(long = "by", value_enum, default_value = "name")]
    pub by: SearchByArg,

    /// Page of results to show (1-based).
    #[arg(long = "page", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Results per page.
    #[arg(long = "per-page", default_value_t = DEFAULT_PER_PAGE as u32, value_parser = clap::value_parser!(u32).range(1..))]
    pub per_page: u32,

    /// Maximum results before pagination.
    #[arg(long = "max-results", default_value_t = roster_search::DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Minimum name similarity in [0, 1].
    #[arg(long = "min-similarity", default_value_t = roster_search::DEFAULT_MIN_SIMILARITY)]
    pub min_similarity: f64,

    /// Emit the selected page as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Number of records to show.
    #[arg(short = 'n', long = "rows", default_value_t = 5)]
    pub rows: usize,
}

#[derive(Args)]
pub struct FilesArgs {
    /// Directory to scan.
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Args)]
pub struct ShellArgs {
    /// Roster to load on start.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SearchByArg {
    Id,
    Name,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
