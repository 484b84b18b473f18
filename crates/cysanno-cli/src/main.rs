//! cysanno - Main entry point

use clap::Parser;
use cysanno_cli::Cli;
use cysanno_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        // Verbose mode: log to console with debug level
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("cysanno".to_string())
            .build()
    } else {
        // Normal mode: warnings and errors to console
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .log_file_prefix("cysanno".to_string())
            .build()
    };

    // Apply environment overrides on top of the verbose-derived config
    let log_config = log_config
        .clone()
        .with_env_overrides()
        .unwrap_or(log_config);

    // Initialize logging (ignore errors as the CLI should work without logging)
    let _ = init_logging(&log_config);

    // Execute the annotation run
    if let Err(e) = cysanno_cli::run::run(&cli).await {
        error!(error = %e, "Annotation run failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
