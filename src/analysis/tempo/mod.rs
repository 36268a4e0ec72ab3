//! Tempo consensus
//!
//! Two strategies run on every signal:
//! - Segment median: the segment estimator on up to three equal excerpts,
//!   folded and reduced to their median. Kept as a cross-check.
//! - Whole track: the whole-track estimator once over the full signal.
//!   Its folded, rounded tempo is the reported value.
//!
//! Tempos are folded by octaves into `[min_bpm, max_bpm)` so that a
//! half-time or double-time detection lands on the same number.

mod beat;
mod onset;

pub use beat::{AutocorrelationTempo, BeatTrackingTempo, MAX_BEAT_CONFIDENCE};
pub use onset::onset_envelope;

use crate::analysis::traits::{SegmentTempoEstimator, WholeTrackTempoEstimator};
use crate::config::TempoSettings;
use crate::error::Result;
use crate::types::{Signal, TempoEstimate};
use tracing::{debug, warn};

/// Octave disagreement (in BPM) above which the cross-check is logged
const DISAGREEMENT_TOLERANCE: u32 = 4;

/// Fold a tempo by octaves into `[min_bpm, max_bpm)`
///
/// Returns `None` for tempos that cannot be folded (zero, negative, NaN or
/// infinite) and for a range narrower than one octave, which no tempo can be
/// folded into.
pub fn fold_tempo(bpm: f64, min_bpm: f64, max_bpm: f64) -> Option<f64> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return None;
    }
    let octave_wide = min_bpm > 0.0 && max_bpm >= 2.0 * min_bpm;
    if !octave_wide || !max_bpm.is_finite() {
        return None;
    }
    let mut folded = bpm;
    while folded < min_bpm {
        folded *= 2.0;
    }
    while folded >= max_bpm {
        folded /= 2.0;
    }
    Some(folded)
}

/// Round a folded tempo, folding again if rounding reached the upper bound
fn round_folded(bpm: f64, min_bpm: f64, max_bpm: f64) -> Option<u32> {
    let rounded = fold_tempo(bpm, min_bpm, max_bpm)?.round();
    fold_tempo(rounded, min_bpm, max_bpm).map(|b| b as u32)
}

/// Median of `values`; the mean of the middle two for an even count
fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Combines the segment and whole-track tempo strategies
pub struct TempoConsensus {
    settings: TempoSettings,
    segment: Box<dyn SegmentTempoEstimator>,
    whole_track: Box<dyn WholeTrackTempoEstimator>,
}

impl TempoConsensus {
    pub fn new(
        settings: TempoSettings,
        segment: Box<dyn SegmentTempoEstimator>,
        whole_track: Box<dyn WholeTrackTempoEstimator>,
    ) -> Self {
        Self {
            settings,
            segment,
            whole_track,
        }
    }

    /// Consensus backed by the autocorrelation and beat-tracking estimators
    pub fn with_defaults(settings: TempoSettings) -> Self {
        Self::new(
            settings,
            Box::new(AutocorrelationTempo::new()),
            Box::new(BeatTrackingTempo::new()),
        )
    }

    /// Estimate the tempo of `signal`
    ///
    /// Fails only if the whole-track estimator fails. An excerpt the segment
    /// estimator rejects is skipped.
    pub fn estimate(&self, signal: &Signal) -> Result<TempoEstimate> {
        let (min, max) = (self.settings.min_bpm, self.settings.max_bpm);

        let segment_tempos = self.segment_tempos(signal);
        let segment_median = median(&segment_tempos)
            .and_then(|m| round_folded(m, min, max))
            .or_else(|| round_folded(self.settings.fallback_bpm, min, max))
            .unwrap_or(min as u32);

        let rhythm = self
            .whole_track
            .estimate(signal)
            .map_err(|e| e.into_tempo_error())?;

        let (bpm, confidence) = match round_folded(rhythm.bpm, min, max) {
            Some(bpm) => {
                let raw = rhythm.beat_confidence / self.settings.confidence_divisor;
                let confidence = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { 0.0 };
                (bpm, confidence)
            }
            None => {
                debug!(
                    "{} reported no usable tempo ({}), using segment median {}",
                    self.whole_track.name(),
                    rhythm.bpm,
                    segment_median
                );
                (segment_median, 0.0)
            }
        };

        let estimate = TempoEstimate {
            bpm,
            confidence,
            segment_median,
            segment_tempos,
        };

        if estimate.disagrees_with_segments(DISAGREEMENT_TOLERANCE) {
            debug!(
                "Whole-track tempo {} disagrees with segment median {}",
                estimate.bpm, estimate.segment_median
            );
        }
        debug!("Tempo: {} BPM (confidence: {:.2})", estimate.bpm, estimate.confidence);

        Ok(estimate)
    }

    /// Folded tempo of each excerpt that produced one
    fn segment_tempos(&self, signal: &Signal) -> Vec<f64> {
        let samples = signal.samples();
        let sample_rate = signal.sample_rate();
        let count = self.settings.segment_count;
        let max_len = (self.settings.max_segment_secs * sample_rate as f64) as usize;
        let excerpt_len = max_len.min(samples.len() / count.max(1));

        if excerpt_len == 0 {
            return Vec::new();
        }

        (0..count)
            .filter_map(|i| samples.get(i * excerpt_len..(i + 1) * excerpt_len))
            .filter_map(|excerpt| match self.segment.estimate(excerpt, sample_rate) {
                Ok(bpm) => fold_tempo(bpm, self.settings.min_bpm, self.settings.max_bpm),
                Err(e) => {
                    warn!("Skipping excerpt, {} failed: {}", self.segment.name(), e);
                    None
                }
            })
            .collect()
    }
}
