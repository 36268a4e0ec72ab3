//! Analysis primitive abstractions
//!
//! These traits are the narrow interfaces the consensus and normalization
//! code calls into. Default implementations live next to the analyses that
//! use them; tests substitute scripted versions.

use crate::error::Result;
use crate::types::{KeyEstimate, RhythmEstimate, Signal};
use rustfft::num_complex::Complex;

/// Tempo estimation on a short excerpt
pub trait SegmentTempoEstimator: Send + Sync {
    /// Estimate the tempo of an excerpt in BPM
    ///
    /// Returns 0.0 when the excerpt shows no periodicity.
    fn estimate(&self, excerpt: &[f32], sample_rate: u32) -> Result<f64>;

    /// Get the name of this estimator (for logging)
    fn name(&self) -> &'static str;
}

/// Tempo and beat estimation over a complete track
pub trait WholeTrackTempoEstimator: Send + Sync {
    fn estimate(&self, signal: &Signal) -> Result<RhythmEstimate>;

    /// Get the name of this estimator (for logging)
    fn name(&self) -> &'static str;
}

/// Musical key detection backend
pub trait KeyExtractor: Send + Sync {
    /// Detect the tonic, scale and match strength of a signal
    fn extract(&self, signal: &Signal) -> Result<KeyEstimate>;

    /// Get the name of this extractor (for logging)
    fn name(&self) -> &'static str;
}

/// Scalar loudness of a single frame
pub trait FrameEnergy: Send + Sync {
    fn energy(&self, frame: &[f32]) -> f32;
}

/// Real-input forward spectral transform
pub trait SpectralTransform: Send + Sync {
    /// Transform a real frame into its `len / 2 + 1` non-negative-frequency bins
    fn forward_real(&self, frame: &[f32]) -> Result<Vec<Complex<f32>>>;

    /// Centre frequency in Hz of every bin `forward_real` returns for `frame_size`
    fn frequency_bins(&self, frame_size: usize, sample_rate: u32) -> Vec<f32> {
        let bin_width = sample_rate as f32 / frame_size as f32;
        (0..frame_size / 2 + 1).map(|k| k as f32 * bin_width).collect()
    }
}
