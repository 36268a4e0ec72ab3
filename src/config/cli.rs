//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// audio-analyzer - Detect BPM, key, energy and vocals
///
/// Analyzes a single audio file and prints one line of JSON to stdout.
/// Logs go to stderr so stdout stays machine-readable.
#[derive(Parser, Debug)]
#[command(name = "audio-analyzer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze audio file and output JSON results
    Analyze {
        /// Path to the audio file (WAV, FLAC, MP3, OGG, AIFF)
        #[arg(value_name = "AUDIO_PATH")]
        audio_path: PathBuf,
    },
}

impl Cli {
    /// Get the log filter directive based on verbosity flags
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// The file being analyzed
    pub fn audio_path(&self) -> &PathBuf {
        match &self.command {
            Command::Analyze { audio_path } => audio_path,
        }
    }
}
