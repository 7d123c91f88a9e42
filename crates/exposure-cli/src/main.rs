//! Cumulative drug exposure CLI.

use clap::{ColorChoice, Parser};
use exposure_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_cumulative, run_timeline};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Cumulative(args) => match run_cumulative(args) {
            Ok(outcome) => {
                print_summary(&outcome);
                if outcome.has_errors() { 1 } else { 0 }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Timeline(args) => match run_timeline(args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let explicit = cli.verbosity.is_present() || cli.log_level.is_some();
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig::default()
        .with_level_filter(level_filter)
        .with_env_filter(!explicit)
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_ansi(with_ansi)
        .with_timestamps(cli.log_timestamps)
        .with_target(cli.log_target)
        .with_log_data(cli.log_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["exposure"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["timeline", "events.csv", "--duration", "3"]);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_log_flags_reach_config() {
        let config = log_config_from_cli(&parse(&["--log-timestamps", "--log-target"]));
        assert!(config.with_timestamps);
        assert!(config.with_target);
    }

    #[test]
    fn test_log_defaults() {
        let config = log_config_from_cli(&parse(&[]));
        assert!(!config.with_timestamps);
        assert!(!config.with_target);
        assert!(config.use_env_filter);
        assert_eq!(config.level_filter, LevelFilter::WARN);
    }

    #[test]
    fn test_explicit_level_disables_env_filter() {
        let config = log_config_from_cli(&parse(&["--log-level", "debug", "--log-format", "json"]));
        assert!(!config.use_env_filter);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
    }
}
