//! Key detection module
//!
//! [`ChromaKeyExtractor`] is the default [`KeyExtractor`]: a chromagram
//! matched against Krumhansl-Kessler key profiles. [`KeyAnalyzer`] turns
//! whatever an extractor reports into a wheel label.

pub mod camelot;

use crate::analysis::spectrum::for_each_stft_frame;
use crate::analysis::traits::KeyExtractor;
use crate::error::{AnalyzerError, Result};
use crate::types::{KeyEstimate, KeySignature, Mode, PitchClass, Signal};
use tracing::{debug, warn};

/// FFT window for the chromagram (~10.8 Hz bins at 44.1 kHz)
const CHROMA_FRAME_SIZE: usize = 4096;

const CHROMA_HOP_SIZE: usize = 2048;

/// Below this, bass rumble dominates (~C2)
const MIN_FREQ: f32 = 65.0;

/// Above this, harmonics rather than fundamentals dominate
const MAX_FREQ: f32 = 2000.0;

/// Krumhansl-Kessler probe tone profiles, tonic first
const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Chromagram and key-profile matching key extractor
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromaKeyExtractor;

impl ChromaKeyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl KeyExtractor for ChromaKeyExtractor {
    fn extract(&self, signal: &Signal) -> Result<KeyEstimate> {
        if signal.len() < CHROMA_FRAME_SIZE {
            return Err(AnalyzerError::analysis(format!(
                "audio too short for key detection: {} samples (need at least {})",
                signal.len(),
                CHROMA_FRAME_SIZE
            )));
        }

        let chroma = chromagram(signal.samples(), signal.sample_rate());
        let total: f64 = chroma.iter().sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(AnalyzerError::analysis("no tonal energy to detect a key from"));
        }

        let (tonic, scale, strength) = match_profiles(&chroma);
        debug!(
            "Chroma key: {} {} (r = {:.3})",
            tonic.to_standard_notation(),
            scale.as_scale(),
            strength
        );

        Ok(KeyEstimate {
            key_name: tonic.to_standard_notation().to_string(),
            scale,
            strength,
        })
    }

    fn name(&self) -> &'static str {
        "chroma"
    }
}

/// Pitch class of a frequency in 12-TET with A4 = 440 Hz
fn pitch_class_of(freq: f32) -> usize {
    let semitones_from_a = 12.0 * (freq / 440.0).log2();
    // A sits at index 9 when counting from C
    (semitones_from_a.round() as i32 + 9).rem_euclid(12) as usize
}

/// Power per pitch class summed over all frames, normalized to sum to 1
fn chromagram(samples: &[f32], sample_rate: u32) -> [f64; 12] {
    let bin_width = sample_rate as f32 / CHROMA_FRAME_SIZE as f32;
    let bin_pitch: Vec<Option<usize>> = (0..CHROMA_FRAME_SIZE / 2 + 1)
        .map(|bin| {
            let freq = bin as f32 * bin_width;
            (MIN_FREQ..=MAX_FREQ).contains(&freq).then(|| pitch_class_of(freq))
        })
        .collect();

    let mut chroma = [0.0f64; 12];
    for_each_stft_frame(samples, CHROMA_FRAME_SIZE, CHROMA_HOP_SIZE, |magnitudes| {
        for (magnitude, pitch) in magnitudes.iter().zip(&bin_pitch) {
            if let Some(pc) = pitch {
                chroma[*pc] += (*magnitude as f64).powi(2);
            }
        }
    });

    let total: f64 = chroma.iter().sum();
    if total > 0.0 {
        chroma.iter_mut().for_each(|v| *v /= total);
    }
    chroma
}

/// Best (tonic, mode, correlation) over all 24 rotated profiles
fn match_profiles(chroma: &[f64; 12]) -> (PitchClass, Mode, f64) {
    let mut best = (PitchClass::C, Mode::Major, f64::NEG_INFINITY);

    for tonic in PitchClass::ALL {
        for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
            let r = pearson(chroma, profile, tonic.to_index() as usize);
            if r > best.2 {
                best = (tonic, mode, r);
            }
        }
    }
    best
}

/// Pearson correlation of `chroma` with `profile` rotated to start at `root`
fn pearson(chroma: &[f64; 12], profile: &[f64; 12], root: usize) -> f64 {
    let rotated = |i: usize| profile[(i + 12 - root) % 12];
    let mean_x = chroma.iter().sum::<f64>() / 12.0;
    let mean_y = profile.iter().sum::<f64>() / 12.0;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (i, &x) in chroma.iter().enumerate() {
        let dx = x - mean_x;
        let dy = rotated(i) - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom > 0.0 {
        cov / denom
    } else {
        0.0
    }
}

/// Maps extractor output onto the harmonic wheel
pub struct KeyAnalyzer {
    extractor: Box<dyn KeyExtractor>,
    fallback_label: &'static str,
}

impl KeyAnalyzer {
    pub fn new(extractor: Box<dyn KeyExtractor>, fallback_label: &'static str) -> Self {
        Self {
            extractor,
            fallback_label,
        }
    }

    /// Analyzer backed by [`ChromaKeyExtractor`]
    pub fn with_defaults(fallback_label: &'static str) -> Self {
        Self::new(Box::new(ChromaKeyExtractor::new()), fallback_label)
    }

    /// Detect the key of `signal`; extractor failures are fatal
    pub fn analyze(&self, signal: &Signal) -> Result<KeySignature> {
        let estimate = self
            .extractor
            .extract(signal)
            .map_err(|e| e.into_key_error())?;

        let pitch_class = PitchClass::from_name(&estimate.key_name).unwrap_or_else(|| {
            warn!(
                "{} reported unknown key name '{}', assuming C",
                self.extractor.name(),
                estimate.key_name
            );
            PitchClass::C
        });
        let mode = estimate.scale;

        let label = camelot::harmonic_label(pitch_class.to_index() as i32, mode.to_index() as i32)
            .unwrap_or(self.fallback_label);

        debug!(
            "Key: {} {} -> {} (strength: {:.3})",
            pitch_class.to_standard_notation(),
            mode.as_scale(),
            label,
            estimate.strength
        );

        Ok(KeySignature {
            pitch_class,
            mode,
            label,
            strength: estimate.strength,
        })
    }
}
