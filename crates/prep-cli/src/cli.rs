//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "prep",
    version,
    about = "Prepare hotel booking data for model training",
    long_about = "Prepare hotel booking train and test tables for model training.\n\n\
                  Drops identifiers and duplicates, label-encodes categoricals, applies \
                  log1p to skewed numerics, oversamples minority classes with SMOTE and \
                  keeps the most important features."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
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
    /// Run the full preparation pipeline on a train/test pair.
    Process(ProcessArgs),

    /// Print the resolved configuration, defaults included.
    ShowConfig(ShowConfigArgs),
}

#[derive(Parser)]
pub struct ProcessArgs {
    /// Raw training table (CSV).
    #[arg(long = "train", value_name = "CSV")]
    pub train: PathBuf,

    /// Raw test table (CSV).
    #[arg(long = "test", value_name = "CSV")]
    pub test: PathBuf,

    /// Directory receiving processed tables and JSON artifacts.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Pipeline configuration with a `[data_processing]` table.
    #[arg(long = "config", value_name = "TOML")]
    pub config: PathBuf,
}

#[derive(Parser)]
pub struct ShowConfigArgs {
    /// Pipeline configuration with a `[data_processing]` table.
    #[arg(long = "config", value_name = "TOML")]
    pub config: PathBuf,
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
