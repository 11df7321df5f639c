//! Healthcare Data Mapper CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use hdm_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use hdm_cli::commands::{run_layout, run_layouts, run_map, run_models, run_test_connection};
use hdm_cli::logging::{LogConfig, LogFormat, init_logging};
use hdm_core::{AppConfig, MappingError};
use tracing::error;
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let config = match AppConfig::discover(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Command::Layouts => run_layouts(&config).map(|()| true),
        Command::Layout(args) => run_layout(&config, args).map(|()| true),
        Command::Models => run_models(&config).map(|()| true),
        Command::TestConnection(args) => run_test_connection(&config, args),
        Command::Map(args) => run_map(&config, args).map(|()| true),
    };
    let exit_code = match result {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(error) => {
            report(&error);
            1
        }
    };
    std::process::exit(exit_code);
}

fn report(error: &anyhow::Error) {
    match error.downcast_ref::<MappingError>() {
        Some(mapping) => {
            error!(stage = %mapping.stage(), retryable = mapping.is_retryable(), "request failed");
            eprintln!("error: {mapping}");
            if let MappingError::Invocation(invoke) = mapping {
                eprintln!("hint: {}", invoke.user_message());
            }
        }
        None => eprintln!("error: {error:#}"),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
