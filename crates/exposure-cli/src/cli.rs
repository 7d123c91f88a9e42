//! CLI argument definitions for the exposure calculator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use exposure_model::DurationUnit;

#[derive(Parser)]
#[command(
    name = "exposure",
    version,
    about = "Cumulative drug exposure calculator",
    long_about = "Build per-patient drug exposure timelines from dated events and\n\
                  report cumulative time before, during, and after query windows."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the module path in log lines.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Allow patient identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute cumulative before/during/after time for each query.
    Cumulative(CumulativeArgs),

    /// Show each patient's merged exposure intervals.
    Timeline(TimelineArgs),
}

/// How long a single drug event lasts.
#[derive(Args)]
pub struct DurationArgs {
    /// Length of one event, in --units.
    #[arg(long = "duration", value_name = "QUANTITY", allow_negative_numbers = true)]
    pub duration: f64,

    /// Unit for --duration (seconds, minutes, hours, days, weeks, years).
    #[arg(long = "units", value_name = "UNIT", default_value = "days")]
    pub units: DurationUnit,
}

#[derive(Args)]
pub struct ColumnArgs {
    /// Patient identifier column in both input files.
    #[arg(long = "patient-col", default_value = "patient_id")]
    pub patient_col: String,

    /// Event timestamp column in the events file.
    #[arg(long = "event-col", default_value = "drug_event_datetime")]
    pub event_col: String,

    /// Window start column in the queries file.
    #[arg(long = "start-col", default_value = "start")]
    pub start_col: String,

    /// Query time column in the queries file.
    #[arg(long = "when-col", default_value = "when")]
    pub when_col: String,
}

#[derive(Parser)]
pub struct CumulativeArgs {
    /// CSV of drug events (patient, event datetime).
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    /// CSV of queries (patient, window start, query time).
    #[arg(value_name = "QUERIES")]
    pub queries: PathBuf,

    #[command(flatten)]
    pub duration: DurationArgs,

    #[command(flatten)]
    pub columns: ColumnArgs,

    /// How each query's time is split.
    #[arg(long = "mode", value_enum, default_value = "exposure")]
    pub mode: ModeArg,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Write results to a file instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Add exact before/during/after durations in seconds.
    #[arg(long = "include-timedelta")]
    pub include_timedelta: bool,

    /// Report invalid queries and continue instead of stopping at the first.
    ///
    /// The exit code is still non-zero when any query was rejected.
    #[arg(long = "skip-invalid")]
    pub skip_invalid: bool,
}

#[derive(Parser)]
pub struct TimelineArgs {
    /// CSV of drug events (patient, event datetime).
    #[arg(value_name = "EVENTS")]
    pub events: PathBuf,

    #[command(flatten)]
    pub duration: DurationArgs,

    /// Patient identifier column.
    #[arg(long = "patient-col", default_value = "patient_id")]
    pub patient_col: String,

    /// Event timestamp column.
    #[arg(long = "event-col", default_value = "drug_event_datetime")]
    pub event_col: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Split stored exposure around [start, when).
    Exposure,
    /// Split elapsed time since start into pre-treatment, on, and off drug.
    TreatmentCourse,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
    Table,
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
