//! CLI definitions.

pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use quantlab_core::types::Interval;
use quantlab_signals::EventKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quantlab")]
#[command(author, version, about = "Market data, signal and labeling research laboratory")]
pub struct Cli {
    /// Configuration file path (missing file means defaults)
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level, overrides the configured level
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download daily archives from Binance Vision
    Fetch(FetchArgs),
    /// Parse downloaded archives into the database
    Ingest(IngestArgs),
    /// Look up the open price of one stored kline
    QueryOpen(QueryOpenArgs),
    /// Run the signal pipeline over stored klines
    Signals(SignalsArgs),
    /// Label signal events with the triple-barrier engine
    Label(LabelArgs),
    /// List available detectors
    Detectors,
    /// Validate configuration
    ValidateConfig(ValidateArgs),
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Trading pair, e.g. BTCUSDT
    #[arg(short, long, required_unless_present = "template")]
    pub symbol: Option<String>,

    /// Kline interval
    #[arg(short, long, default_value = "1d")]
    pub interval: Interval,

    /// First day (YYYY-MM-DD)
    #[arg(long, requires = "end", conflicts_with_all = ["days_ago_start", "template"])]
    pub start: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD), inclusive
    #[arg(long, requires = "start", conflicts_with = "template")]
    pub end: Option<NaiveDate>,

    /// First day as a number of days before today
    #[arg(long, conflicts_with = "template")]
    pub days_ago_start: Option<u32>,

    /// Last day as a number of days before today (default 0)
    #[arg(long, requires = "days_ago_start", conflicts_with = "template")]
    pub days_ago_end: Option<u32>,

    /// Fetch trades instead of klines
    #[arg(long)]
    pub trades: bool,

    /// Saved request template (JSON file)
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Name recorded on the request
    #[arg(long, default_value = "cli")]
    pub name: String,

    /// Store the downloaded files after fetching
    #[arg(long)]
    pub ingest: bool,

    /// Write the effective request to a template file
    #[arg(long)]
    pub save_template: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct IngestArgs {
    /// Archive files to process
    pub paths: Vec<PathBuf>,

    /// Directory searched recursively for archives
    #[arg(long, conflicts_with = "paths")]
    pub dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct QueryOpenArgs {
    #[arg(short, long)]
    pub symbol: String,

    #[arg(short, long, default_value = "1d")]
    pub interval: Interval,

    /// Kline open time, UTC ("YYYY-MM-DD HH:MM:SS")
    #[arg(short, long)]
    pub time: String,
}

#[derive(clap::Args)]
pub struct SignalsArgs {
    #[arg(short, long)]
    pub symbol: String,

    #[arg(short, long, default_value = "1d")]
    pub interval: Interval,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Print every row, not only flagged ones
    #[arg(long)]
    pub all_rows: bool,

    /// Include accumulation zone summaries
    #[arg(long)]
    pub zones: bool,
}

#[derive(clap::Args)]
pub struct LabelArgs {
    #[arg(short, long)]
    pub symbol: String,

    #[arg(short, long, default_value = "1d")]
    pub interval: Interval,

    /// Rows used as events (key-candles, triple)
    #[arg(short, long, default_value = "triple")]
    pub events: EventKind,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the report (.csv writes labels only, anything else JSON)
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub show: bool,
}
