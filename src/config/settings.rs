//! Runtime configuration settings
//!
//! Every constant the analyses depend on lives here so tests can exercise
//! the algorithms with small frames while the CLI always runs the defaults.

use crate::error::{AnalyzerError, Result};

/// Sample rate every decoded signal is resampled to
pub const ANALYSIS_SAMPLE_RATE: u32 = 44100;

/// Tempo consensus settings
#[derive(Debug, Clone, PartialEq)]
pub struct TempoSettings {
    /// Lower bound of the folded tempo range (inclusive)
    pub min_bpm: f64,
    /// Upper bound of the folded tempo range (exclusive)
    pub max_bpm: f64,
    /// Number of equal excerpts for the segment-median cross-check
    pub segment_count: usize,
    /// Maximum excerpt length in seconds
    pub max_segment_secs: f64,
    /// Tempo reported by the cross-check when no excerpt yields a value
    pub fallback_bpm: f64,
    /// beat_confidence / divisor = reported confidence
    pub confidence_divisor: f64,
}

impl Default for TempoSettings {
    fn default() -> Self {
        Self {
            min_bpm: 80.0,
            max_bpm: 160.0,
            segment_count: 3,
            max_segment_secs: 30.0,
            fallback_bpm: 120.0,
            confidence_divisor: 10.0,
        }
    }
}

/// Energy normalization settings
#[derive(Debug, Clone, PartialEq)]
pub struct EnergySettings {
    pub frame_size: usize,
    pub hop_size: usize,
    /// Percentile treated as "typical loud" content
    pub typical_percentile: f64,
    /// Percentile treated as peak loudness
    pub peak_percentile: f64,
    /// Added to the peak to avoid division by zero
    pub epsilon: f64,
    /// Score reported when no frames are available or the computation fails
    pub default_score: u8,
}

impl Default for EnergySettings {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 1024,
            typical_percentile: 95.0,
            peak_percentile: 99.9,
            epsilon: 0.001,
            default_score: 50,
        }
    }
}

/// Vocal band classifier settings
#[derive(Debug, Clone, PartialEq)]
pub struct VocalSettings {
    pub frame_size: usize,
    pub hop_size: usize,
    /// Lower edge of the vocal band in Hz (inclusive); also the sub-bass cutoff
    pub band_low_hz: f32,
    /// Upper edge of the vocal band in Hz (inclusive)
    pub band_high_hz: f32,
    /// Only the first N qualifying frames are averaged
    pub max_frames: usize,
    /// Mean ratio above which vocals are reported
    pub ratio_threshold: f64,
}

impl Default for VocalSettings {
    fn default() -> Self {
        Self {
            frame_size: 4096,
            hop_size: 2048,
            band_low_hz: 200.0,
            band_high_hz: 4000.0,
            max_frames: 100,
            ratio_threshold: 0.70,
        }
    }
}

/// Runtime settings for the analysis pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Sample rate the decoder resamples to
    pub sample_rate: u32,
    pub tempo: TempoSettings,
    pub energy: EnergySettings,
    pub vocals: VocalSettings,
    /// Label used when the key cannot be mapped onto the wheel
    pub fallback_key: &'static str,
}

impl Settings {
    /// Create settings from CLI arguments
    ///
    /// The CLI exposes no tuning flags; this exists so the binary and tests
    /// go through the same validation.
    pub fn from_cli(_cli: &super::cli::Cli) -> Result<Self> {
        let settings = Self::default();
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the analyses cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AnalyzerError::ConfigError("sample rate must be positive".into()));
        }
        let tempo = &self.tempo;
        if !(tempo.min_bpm > 0.0 && tempo.max_bpm >= tempo.min_bpm * 2.0) {
            return Err(AnalyzerError::ConfigError(format!(
                "tempo range [{}, {}) must span at least one octave",
                tempo.min_bpm, tempo.max_bpm
            )));
        }
        if tempo.segment_count == 0 || tempo.confidence_divisor <= 0.0 {
            return Err(AnalyzerError::ConfigError(
                "tempo segment count and confidence divisor must be positive".into(),
            ));
        }
        check_framing("energy", self.energy.frame_size, self.energy.hop_size)?;
        check_framing("vocal", self.vocals.frame_size, self.vocals.hop_size)?;
        if self.vocals.band_low_hz >= self.vocals.band_high_hz {
            return Err(AnalyzerError::ConfigError(format!(
                "vocal band {}-{} Hz is inverted",
                self.vocals.band_low_hz, self.vocals.band_high_hz
            )));
        }
        Ok(())
    }
}

fn check_framing(name: &str, frame_size: usize, hop_size: usize) -> Result<()> {
    if frame_size == 0 || hop_size == 0 || hop_size > frame_size {
        return Err(AnalyzerError::ConfigError(format!(
            "{} framing needs 0 < hop ({}) <= frame ({})",
            name, hop_size, frame_size
        )));
    }
    Ok(())
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: ANALYSIS_SAMPLE_RATE,
            tempo: TempoSettings::default(),
            energy: EnergySettings::default(),
            vocals: VocalSettings::default(),
            fallback_key: "8A",
        }
    }
}
