//! audio-analyzer - Single-track audio analysis for DJ tooling
//!
//! Decodes one audio file and reports its tempo, Camelot key, relative
//! energy and whether it likely contains vocals, as a single JSON record.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and runtime settings
//! - `audio`: Audio decoding using symphonia, resampling using rubato
//! - `analysis`: Tempo, key, energy and vocal analysis (with swappable primitives)
//! - `pipeline`: Single-file orchestration and the logging context
//! - `export`: JSON output
//!
//! # Example
//!
//! ```no_run
//! use audio_analyzer::{config::Settings, export, pipeline::{Analyzer, LogContext}};
//! use std::path::Path;
//!
//! let analyzer = Analyzer::new(Settings::default(), LogContext::silent())?;
//! let report = analyzer.analyze_file(Path::new("track.flac"))?;
//! println!("{}", export::to_json_line(&report)?);
//! # Ok::<(), audio_analyzer::AnalyzerError>(())
//! ```

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod types;

// Re-export key types at crate root
pub use error::{AnalyzerError, Outcome, Result};
pub use pipeline::{Analyzer, LogContext};
pub use types::{AnalysisReport, KeySignature, Signal, TempoEstimate};
