//! audio-analyzer CLI entry point

use audio_analyzer::config::{Cli, Settings};
use audio_analyzer::export;
use audio_analyzer::pipeline::{Analyzer, LogContext};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, Dispatch};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log = init_logging(&cli);

    match run(&cli, log.clone()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log.scope(|| error!("Analysis failed: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, log: LogContext) -> audio_analyzer::Result<()> {
    // Build settings from CLI
    let settings = Settings::from_cli(cli)?;

    let analyzer = Analyzer::new(settings, log)?;
    let report = analyzer.analyze_file(cli.audio_path())?;

    export::write_report(&report, std::io::stdout().lock())
}

/// Build the stderr subscriber; stdout carries only the JSON line
fn init_logging(cli: &Cli) -> LogContext {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    LogContext::new(Dispatch::new(subscriber))
}
