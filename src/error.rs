//! Unified error types for audio-analyzer
//!
//! Error strategy:
//! - Input errors (missing, empty, undecodable file): fatal, no record
//! - Tempo and key errors: fatal, no record
//! - Energy and vocal errors: contained inside their analysis, reported
//!   through [`Outcome::Degraded`] and never surfaced as an `Err`
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "WAV, FLAC, MP3, OGG/Vorbis, AIFF";

/// Top-level error type for audio-analyzer operations
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // =========================================================================
    // Input errors - no record is produced
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    #[error("Audio file '{0}' is empty")]
    EmptyFile(PathBuf),

    // =========================================================================
    // Analysis errors - tempo and key share the fatal boundary
    // =========================================================================
    #[error("Tempo analysis failed: {reason}")]
    TempoError { reason: String },

    #[error("Key analysis failed: {reason}")]
    KeyError { reason: String },

    /// Raised by the analysis primitives; callers decide whether it is fatal
    #[error("Analysis failed: {reason}")]
    AnalysisError { reason: String },

    // =========================================================================
    // Process errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to serialize analysis result: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for audio-analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl AnalyzerError {
    /// Returns true if the input file itself could not be turned into a signal
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AnalyzerError::DecodeError { .. }
                | AnalyzerError::UnsupportedFormat { .. }
                | AnalyzerError::FileNotFound(_)
                | AnalyzerError::EmptyFile(_)
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AnalyzerError::DecodeError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a primitive-level analysis error
    pub fn analysis(reason: impl Into<String>) -> Self {
        AnalyzerError::AnalysisError {
            reason: reason.into(),
        }
    }

    /// Re-tag an error raised while estimating tempo
    pub fn into_tempo_error(self) -> Self {
        match self {
            AnalyzerError::AnalysisError { reason } => AnalyzerError::TempoError { reason },
            other => other,
        }
    }

    /// Re-tag an error raised while extracting the key
    pub fn into_key_error(self) -> Self {
        match self {
            AnalyzerError::AnalysisError { reason } => AnalyzerError::KeyError { reason },
            other => other,
        }
    }
}

/// Outcome of an analysis whose failures are contained locally
///
/// Energy and vocal detection never abort the pipeline: a failure still
/// yields a value (the documented default) plus the reason it was used.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The analysis ran to completion
    Measured(T),
    /// The analysis failed and the default was substituted
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    /// Build an outcome from a fallible computation, substituting `default` on error
    pub fn contain<E: std::fmt::Display>(result: std::result::Result<T, E>, default: T) -> Self {
        match result {
            Ok(value) => Outcome::Measured(value),
            Err(e) => Outcome::Degraded {
                value: default,
                reason: e.to_string(),
            },
        }
    }

    /// The value to report, measured or default
    pub fn value(&self) -> &T {
        match self {
            Outcome::Measured(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Measured(value) | Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }
}
