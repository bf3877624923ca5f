//! CLI argument definitions for datacert.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "datacert",
    version,
    about = "datacert - certify tabular datasets against a declarative entity schema",
    long_about = "Validate exported or ingested tables against a declarative entity schema\n\
                  and produce auditable quality reports.\n\n\
                  Emits a Markdown report for operators and a JSON report for tooling,\n\
                  both named with the run timestamp."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    ///
    /// Per-table progress lines are emitted at info, the default.
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a table corpus and write quality reports.
    Run(RunArgs),

    /// List the entity types declared by a schema document.
    Entities(EntitiesArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the JSON schema document (entity types and field constraints).
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,

    /// Path to the JSON run configuration (table mapping, budget, overrides).
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Directory holding the tables (single CSV files or partition directories).
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Output directory for report files (default: <DATA_DIR>/reports).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Identifier-index CSV (entity_type,field,value) enabling foreign-key checks.
    #[arg(long = "identifier-index", value_name = "PATH")]
    pub identifier_index: Option<PathBuf>,

    /// Validate every row of every table, chunked to bound memory.
    #[arg(long)]
    pub exhaustive: bool,

    /// Worker threads, one table per worker (default: available parallelism).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub workers: usize,

    /// Override the configured sample cap for large tables.
    #[arg(long = "sample-cap", value_name = "ROWS")]
    pub sample_cap: Option<u64>,

    /// Override the configured chunk size.
    #[arg(long = "chunk-size", value_name = "ROWS")]
    pub chunk_size: Option<u64>,

    /// Validate and print the summary without writing report files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct EntitiesArgs {
    /// Path to the JSON schema document.
    #[arg(long, value_name = "PATH")]
    pub schema: PathBuf,
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
