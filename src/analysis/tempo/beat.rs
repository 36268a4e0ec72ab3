//! Default tempo primitives: envelope autocorrelation and beat placement
//!
//! Both estimators share the same period search. The segment estimator only
//! reports a tempo; the whole-track estimator also lays a beat grid over the
//! envelope and reports how strongly the envelope repeats at that period.

use super::onset::{frame_duration, onset_envelope};
use crate::analysis::traits::{SegmentTempoEstimator, WholeTrackTempoEstimator};
use crate::error::{AnalyzerError, Result};
use crate::types::{RhythmEstimate, Signal};
use tracing::{debug, trace};

/// Slowest tempo the period search considers
const MIN_SEARCH_BPM: f32 = 50.0;

/// Fastest tempo the period search considers
const MAX_SEARCH_BPM: f32 = 220.0;

/// Envelopes shorter than this carry too few beats to autocorrelate
const MIN_ENVELOPE_FRAMES: usize = 64;

/// Peak correlation below this means no periodicity
const MIN_CORRELATION: f32 = 0.05;

/// Upper end of the beat confidence scale; above ~3.5 is a very steady beat
pub const MAX_BEAT_CONFIDENCE: f64 = 5.32;

/// Result of the period search over an onset envelope
#[derive(Debug, Clone, Copy, PartialEq)]
struct Periodicity {
    /// Beat period in envelope frames, refined to sub-frame precision
    period_frames: f32,
    /// Normalized autocorrelation at the best lag (0 - 1)
    correlation: f32,
}

/// Find the dominant beat period of an onset envelope by autocorrelation
fn find_periodicity(envelope: &[f32], sample_rate: u32) -> Option<Periodicity> {
    if envelope.len() < MIN_ENVELOPE_FRAMES {
        return None;
    }

    let frame_secs = frame_duration(sample_rate);
    let min_lag = (60.0 / (MAX_SEARCH_BPM * frame_secs)).floor().max(1.0) as usize;
    let max_lag = ((60.0 / (MIN_SEARCH_BPM * frame_secs)).ceil() as usize).min(envelope.len() / 2);
    if min_lag >= max_lag {
        return None;
    }

    // Subtract mean to remove DC bias
    let mean = envelope.iter().sum::<f32>() / envelope.len() as f32;
    let centered: Vec<f32> = envelope.iter().map(|&x| x - mean).collect();
    let energy: f32 = centered.iter().map(|&x| x * x).sum();
    if energy < 1e-10 {
        return None;
    }

    let n = centered.len();
    let corr_at = |lag: usize| -> f32 {
        centered[..n - lag]
            .iter()
            .zip(&centered[lag..])
            .map(|(&a, &b)| a * b)
            .sum::<f32>()
            / energy
    };

    let correlations: Vec<f32> = (min_lag..=max_lag).map(corr_at).collect();
    let (best_offset, &best_corr) = correlations
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    let best_lag = min_lag + best_offset;

    trace!("Autocorrelation peak at lag {} (r = {:.3})", best_lag, best_corr);

    if best_corr < MIN_CORRELATION {
        return None;
    }

    // Parabolic interpolation around the peak for sub-frame precision
    let period_frames = if best_offset > 0 && best_offset + 1 < correlations.len() {
        let prev = correlations[best_offset - 1];
        let next = correlations[best_offset + 1];
        let denom = prev - 2.0 * best_corr + next;
        if denom.abs() > 1e-10 {
            best_lag as f32 + 0.5 * (prev - next) / denom
        } else {
            best_lag as f32
        }
    } else {
        best_lag as f32
    };

    Some(Periodicity {
        period_frames,
        correlation: best_corr.clamp(0.0, 1.0),
    })
}

fn period_to_bpm(period_frames: f32, sample_rate: u32) -> f64 {
    60.0 / (period_frames * frame_duration(sample_rate)) as f64
}

/// Place beats at the phase whose grid collects the most onset strength
fn place_beats(envelope: &[f32], period_frames: f32, sample_rate: u32) -> Vec<f64> {
    let len = envelope.len();
    let grid = move |phase: f32| {
        (0u32..)
            .map(move |k| phase + k as f32 * period_frames)
            .map(|pos| pos.round() as usize)
            .take_while(move |&idx| idx < len)
    };

    let phases = period_frames.ceil() as usize;
    let best_phase = (0..phases)
        .map(|phase| {
            let score: f32 = grid(phase as f32).map(|idx| envelope[idx]).sum();
            (phase, score)
        })
        .max_by(|a, b| a.1.total_cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(phase, _)| phase as f32)
        .unwrap_or(0.0);

    let frame_secs = frame_duration(sample_rate) as f64;
    grid(best_phase).map(|idx| idx as f64 * frame_secs).collect()
}

fn check_input(samples: &[f32], sample_rate: u32) -> Result<()> {
    if samples.is_empty() {
        return Err(AnalyzerError::analysis("no audio samples to analyze"));
    }
    if sample_rate == 0 {
        return Err(AnalyzerError::analysis("invalid sample rate 0"));
    }
    Ok(())
}

/// Segment tempo estimator using onset-envelope autocorrelation
#[derive(Debug, Default, Clone, Copy)]
pub struct AutocorrelationTempo;

impl AutocorrelationTempo {
    pub fn new() -> Self {
        Self
    }
}

impl SegmentTempoEstimator for AutocorrelationTempo {
    fn estimate(&self, excerpt: &[f32], sample_rate: u32) -> Result<f64> {
        check_input(excerpt, sample_rate)?;

        let envelope = onset_envelope(excerpt);
        let bpm = find_periodicity(&envelope, sample_rate)
            .map(|p| period_to_bpm(p.period_frames, sample_rate))
            .unwrap_or(0.0);

        debug!("Excerpt tempo: {:.2} BPM ({} samples)", bpm, excerpt.len());
        Ok(bpm)
    }

    fn name(&self) -> &'static str {
        "autocorrelation"
    }
}

/// Whole-track tempo and beat estimator
#[derive(Debug, Default, Clone, Copy)]
pub struct BeatTrackingTempo;

impl BeatTrackingTempo {
    pub fn new() -> Self {
        Self
    }
}

impl WholeTrackTempoEstimator for BeatTrackingTempo {
    fn estimate(&self, signal: &Signal) -> Result<RhythmEstimate> {
        let sample_rate = signal.sample_rate();
        check_input(signal.samples(), sample_rate)?;

        let envelope = onset_envelope(signal.samples());
        let Some(periodicity) = find_periodicity(&envelope, sample_rate) else {
            debug!("No periodicity found in {} envelope frames", envelope.len());
            return Ok(RhythmEstimate {
                bpm: 0.0,
                beats: Vec::new(),
                beat_confidence: 0.0,
            });
        };

        let bpm = period_to_bpm(periodicity.period_frames, sample_rate);
        let beats = place_beats(&envelope, periodicity.period_frames, sample_rate);
        let beat_confidence = periodicity.correlation as f64 * MAX_BEAT_CONFIDENCE;

        debug!(
            "Whole-track tempo: {:.2} BPM, {} beats (confidence: {:.2})",
            bpm,
            beats.len(),
            beat_confidence
        );

        Ok(RhythmEstimate {
            bpm,
            beats,
            beat_confidence,
        })
    }

    fn name(&self) -> &'static str {
        "beat-tracking"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decaying 5 ms clicks at `bpm`
    fn click_track(bpm: f64, seconds: f64, sample_rate: u32) -> Vec<f32> {
        let total = (seconds * sample_rate as f64) as usize;
        let spacing = 60.0 / bpm * sample_rate as f64;
        let click_len = (0.005 * sample_rate as f64) as usize;
        let mut samples = vec![0.0f32; total];
        let mut position = 0.0f64;
        while (position as usize) < total {
            let start = position as usize;
            for j in 0..click_len.min(total - start) {
                samples[start + j] = 0.8 * (-5.0 * j as f32 / click_len as f32).exp();
            }
            position += spacing;
        }
        samples
    }

    fn is_octave_match(detected: f64, target: f64, tolerance: f64) -> bool {
        [target, target / 2.0, target * 2.0]
            .iter()
            .any(|t| (detected - t).abs() <= tolerance)
    }

    #[test]
    fn test_segment_estimator_finds_120() {
        let samples = click_track(120.0, 10.0, 44100);
        let bpm = AutocorrelationTempo::new().estimate(&samples, 44100).unwrap();
        assert!(is_octave_match(bpm, 120.0, 2.0), "got {:.2}", bpm);
    }

    #[test]
    fn test_segment_estimator_silence_is_zero() {
        let bpm = AutocorrelationTempo::new().estimate(&vec![0.0; 44100 * 5], 44100).unwrap();
        assert_eq!(bpm, 0.0);
    }

    #[test]
    fn test_estimators_reject_empty_input() {
        assert!(AutocorrelationTempo::new().estimate(&[], 44100).is_err());
        let empty = Signal::new(Vec::new(), 44100);
        assert!(BeatTrackingTempo::new().estimate(&empty).is_err());
    }

    #[test]
    fn test_whole_track_reports_beats_and_confidence() {
        let signal = Signal::new(click_track(128.0, 12.0, 44100), 44100);
        let rhythm = BeatTrackingTempo::new().estimate(&signal).unwrap();

        assert!(is_octave_match(rhythm.bpm, 128.0, 2.0), "got {:.2}", rhythm.bpm);
        assert!(rhythm.beat_confidence > 0.0 && rhythm.beat_confidence <= MAX_BEAT_CONFIDENCE);
        assert!(rhythm.beats.len() >= 10);
        assert!(rhythm.beats.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_whole_track_short_signal_has_no_tempo() {
        // 0.5 s is under the envelope length the period search needs
        let signal = Signal::new(vec![0.1; 22050], 44100);
        let rhythm = BeatTrackingTempo::new().estimate(&signal).unwrap();
        assert_eq!(rhythm.bpm, 0.0);
        assert_eq!(rhythm.beat_confidence, 0.0);
    }

    #[test]
    fn test_place_beats_follows_peaks() {
        let mut envelope = vec![0.0f32; 100];
        for i in (3..100).step_by(10) {
            envelope[i] = 1.0;
        }
        let beats = place_beats(&envelope, 10.0, 44100);
        let first_frame = (beats[0] / frame_duration(44100) as f64).round() as usize;
        assert_eq!(first_frame, 3);
        assert_eq!(beats.len(), 10);
    }
}
