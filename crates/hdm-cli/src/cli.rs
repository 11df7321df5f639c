//! CLI argument definitions for the healthcare data mapper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "hdm",
    version,
    about = "Healthcare Data Mapper - map data dictionaries onto standard layouts",
    long_about = "Map a healthcare data dictionary onto one of the standard output layouts.\n\n\
                  Reads CSV, TSV or PDF dictionaries, asks a language model for a\n\
                  field-by-field mapping and validates the answer against the layout."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: $HDM_CONFIG, then ./hdm.toml).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

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
}

#[derive(Subcommand)]
pub enum Command {
    /// List the supported output layouts.
    Layouts,

    /// Show the fields of one layout.
    Layout(LayoutArgs),

    /// List the configured model selectors.
    Models,

    /// Send a short test prompt to a model.
    TestConnection(TestConnectionArgs),

    /// Map a data dictionary onto a layout.
    Map(MapArgs),
}

#[derive(Args)]
pub struct LayoutArgs {
    /// Layout id or display name (e.g. member, "Bill Custom Detail").
    #[arg(value_name = "LAYOUT")]
    pub layout: String,

    /// Number of fields to show.
    #[arg(long = "limit", value_name = "N", default_value_t = hdm_layouts::DEFAULT_PREVIEW_LIMIT)]
    pub limit: usize,

    /// Show every field.
    #[arg(long = "all", conflicts_with = "limit")]
    pub all: bool,
}

#[derive(Args)]
pub struct TestConnectionArgs {
    /// Model selector to test (default: every configured model).
    #[arg(value_name = "MODEL")]
    pub model: Option<String>,
}

#[derive(Args)]
pub struct MapArgs {
    /// Target layout id or display name.
    #[arg(long = "layout", value_name = "LAYOUT")]
    pub layout: String,

    /// Data dictionary file (.csv, .tsv or .pdf).
    #[arg(long = "dictionary", value_name = "PATH")]
    pub dictionary: PathBuf,

    /// Comma-separated source table names.
    #[arg(long = "tables", value_name = "LIST")]
    pub tables: String,

    /// Model selector.
    #[arg(long = "model", value_name = "MODEL", default_value = "claude-sonnet-4")]
    pub model: String,

    /// Write the mapping as JSON to this file.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the mapping JSON to stdout instead of a table.
    #[arg(long = "json", conflicts_with = "prompt_only")]
    pub json: bool,

    /// Include the request summary in the JSON output.
    #[arg(long = "envelope")]
    pub envelope: bool,

    /// Compose and print the prompt without calling the model.
    #[arg(long = "prompt-only")]
    pub prompt_only: bool,
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
