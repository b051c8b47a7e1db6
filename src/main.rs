// PHI Guard - PHI Exposure Scoring and Anonymization Tool
// Copyright (c) 2025 PHI Guard Contributors
// Licensed under the MIT License

use clap::Parser;
use phi_guard::cli::commands::{load_settings, EXIT_FATAL};
use phi_guard::cli::Cli;
use phi_guard::config::LoggingConfig;
use phi_guard::logging::init_logging;
use std::process;

fn main() {
    // Optional; a missing .env is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging only when the configuration enables it
    let settings = load_settings(&cli.config).ok();
    let logging_config = settings
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(LoggingConfig::console_only);
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| settings.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());

    let guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "PHI Guard starting");

    let exit_code = match cli.execute() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e:#}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush file logs first
    drop(guard);
    process::exit(exit_code);
}
