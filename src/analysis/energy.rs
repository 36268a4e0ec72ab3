//! Relative energy score
//!
//! Compares "typical loud" frame energy (95th percentile) with peak frame
//! energy (99.9th percentile). A heavily compressed track sits close to its
//! peaks all the time and scores near 100; a dynamic one scores lower.

use crate::analysis::spectrum::leading_frame_starts;
use crate::analysis::traits::FrameEnergy;
use crate::config::EnergySettings;
use crate::error::{AnalyzerError, Outcome, Result};
use tracing::{debug, warn};

/// Sum of squared samples
#[derive(Debug, Default, Clone, Copy)]
pub struct SquaredSumEnergy;

impl FrameEnergy for SquaredSumEnergy {
    fn energy(&self, frame: &[f32]) -> f32 {
        frame.iter().map(|&x| x * x).sum()
    }
}

/// Percentile of `values` with linear interpolation between closest ranks
///
/// `percentile` is in [0, 100]. Returns `None` for an empty slice.
pub fn percentile(values: &[f64], percentile: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (percentile / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Maps frame energies onto a 0 - 100 score
pub struct EnergyNormalizer {
    settings: EnergySettings,
    energy: Box<dyn FrameEnergy>,
}

impl EnergyNormalizer {
    pub fn new(settings: EnergySettings, energy: Box<dyn FrameEnergy>) -> Self {
        Self { settings, energy }
    }

    pub fn with_defaults(settings: EnergySettings) -> Self {
        Self::new(settings, Box::new(SquaredSumEnergy))
    }

    /// Score `samples`; never fails, degrades to the default score
    pub fn score(&self, samples: &[f32]) -> Outcome<u8> {
        let outcome = Outcome::contain(self.try_score(samples), self.settings.default_score);
        match &outcome {
            Outcome::Measured(score) => debug!("Energy: {}", score),
            Outcome::Degraded { value, reason } => {
                warn!("Energy analysis failed, using default {}: {}", value, reason)
            }
        }
        outcome
    }

    fn try_score(&self, samples: &[f32]) -> Result<u8> {
        let (frame_size, hop_size) = (self.settings.frame_size, self.settings.hop_size);

        let energies: Vec<f64> = leading_frame_starts(samples.len(), frame_size, hop_size)
            .map(|start| self.energy.energy(&samples[start..start + frame_size]) as f64)
            .collect();

        if energies.is_empty() {
            debug!("No energy frames in {} samples", samples.len());
            return Ok(self.settings.default_score);
        }
        if let Some(bad) = energies.iter().find(|e| !e.is_finite()) {
            return Err(AnalyzerError::analysis(format!("non-finite frame energy {}", bad)));
        }

        // Both are Some: energies is non-empty
        let typical = percentile(&energies, self.settings.typical_percentile).unwrap_or(0.0);
        let peak = percentile(&energies, self.settings.peak_percentile).unwrap_or(0.0);

        let raw = (typical / (peak + self.settings.epsilon)).min(1.0);
        if !raw.is_finite() {
            return Err(AnalyzerError::analysis(format!(
                "energy ratio {} / {} is not finite",
                typical, peak
            )));
        }

        Ok((raw * 100.0).floor().clamp(0.0, 100.0) as u8)
    }
}
