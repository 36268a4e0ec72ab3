//! Core data types for audio-analyzer
//!
//! These types represent the domain model and flow through the pipeline.

use serde::{Deserialize, Serialize};

// =============================================================================
// Musical primitives
// =============================================================================

/// The 12 pitch classes in Western music
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs, // C#/Db
    D,
    Ds, // D#/Eb
    E,
    F,
    Fs, // F#/Gb
    G,
    Gs, // G#/Ab
    A,
    As, // A#/Bb
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Convert to numeric index (0 = C, 1 = C#, ..., 11 = B)
    pub fn to_index(self) -> u8 {
        self as u8
    }

    /// Parse a note name, accepting sharp and flat spellings ("F#", "Gb", "Bb")
    pub fn from_name(name: &str) -> Option<Self> {
        let pitch = match name.trim() {
            "C" | "B#" => PitchClass::C,
            "C#" | "Db" => PitchClass::Cs,
            "D" => PitchClass::D,
            "D#" | "Eb" => PitchClass::Ds,
            "E" | "Fb" => PitchClass::E,
            "F" | "E#" => PitchClass::F,
            "F#" | "Gb" => PitchClass::Fs,
            "G" => PitchClass::G,
            "G#" | "Ab" => PitchClass::Gs,
            "A" => PitchClass::A,
            "A#" | "Bb" => PitchClass::As,
            "B" | "Cb" => PitchClass::B,
            _ => return None,
        };
        Some(pitch)
    }

    /// Standard notation (e.g., "C", "F#")
    pub fn to_standard_notation(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }
}

/// Major or Minor scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Numeric mode used by the harmonic wheel lookup (0 = minor, 1 = major)
    pub fn to_index(self) -> u8 {
        match self {
            Mode::Minor => 0,
            Mode::Major => 1,
        }
    }

    /// Anything other than "major" is treated as minor
    pub fn from_scale(scale: &str) -> Self {
        if scale.eq_ignore_ascii_case("major") {
            Mode::Major
        } else {
            Mode::Minor
        }
    }

    pub fn as_scale(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

// =============================================================================
// Primitive outputs
// =============================================================================

/// Output of the whole-track tempo primitive
#[derive(Debug, Clone, PartialEq)]
pub struct RhythmEstimate {
    /// Raw tempo in BPM, before octave folding (0.0 when no periodicity was found)
    pub bpm: f64,
    /// Beat positions in seconds
    pub beats: Vec<f64>,
    /// Beat confidence on a 0 - 5.32 scale; above ~3.5 is a very steady beat
    pub beat_confidence: f64,
}

/// Output of the key extraction primitive
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEstimate {
    /// Tonic name, one of the 12 chromatic names
    pub key_name: String,
    pub scale: Mode,
    /// Relative strength of the match; not normalized
    pub strength: f64,
}

// =============================================================================
// Analysis results
// =============================================================================

/// Consensus tempo produced by the tempo analysis
#[derive(Debug, Clone, PartialEq)]
pub struct TempoEstimate {
    /// Folded, rounded BPM in [80, 160)
    pub bpm: u32,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f64,
    /// Median of the folded per-excerpt tempos (cross-check, not reported)
    pub segment_median: u32,
    /// Folded tempo of every excerpt that produced a value
    pub segment_tempos: Vec<f64>,
}

impl TempoEstimate {
    /// True when the whole-track and excerpt estimates disagree by more than `tolerance` BPM
    pub fn disagrees_with_segments(&self, tolerance: u32) -> bool {
        self.bpm.abs_diff(self.segment_median) > tolerance
    }
}

/// Musical key analysis result
#[derive(Debug, Clone, PartialEq)]
pub struct KeySignature {
    pub pitch_class: PitchClass,
    pub mode: Mode,
    /// Harmonic wheel notation ("1A" - "12B")
    pub label: &'static str,
    /// Extractor strength, relative only
    pub strength: f64,
}

/// The single record produced for one analyzed file
///
/// Field order is the JSON field order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub bpm: u32,
    pub key: String,
    pub energy: u8,
    pub has_vocals: bool,
    pub bpm_confidence: f64,
    pub key_confidence: f64,
}

// =============================================================================
// Audio buffer types
// =============================================================================

/// Decoded mono audio, immutable once created
#[derive(Debug, Clone)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
    duration: f64,
}

impl Signal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    /// Mono samples normalized to [-1.0, 1.0]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Ogg,
    Aiff,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" | "wave" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "ogg" | "oga" => Some(AudioFormat::Ogg),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            _ => None,
        }
    }
}
