//! Vocal presence heuristic
//!
//! Measures how much of each frame's above-sub-bass power falls in the
//! 200 Hz - 4 kHz band. Only the opening frames are considered, so a track
//! whose vocals start late reads as instrumental.

use crate::analysis::spectrum::{leading_frame_starts, FftSpectrum};
use crate::analysis::traits::SpectralTransform;
use crate::config::VocalSettings;
use crate::error::{Outcome, Result};
use tracing::{debug, trace, warn};

/// Band power ratio classifier
pub struct VocalBandClassifier {
    settings: VocalSettings,
    transform: Box<dyn SpectralTransform>,
}

/// Power split of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BandPower {
    vocal: f64,
    low: f64,
    total: f64,
}

impl BandPower {
    /// Vocal share of the power above the sub-bass, if there is any
    fn ratio(&self) -> Option<f64> {
        let reference = self.total - self.low;
        if self.total == 0.0 || reference <= 0.0 {
            None
        } else {
            Some(self.vocal / reference)
        }
    }
}

impl VocalBandClassifier {
    pub fn new(settings: VocalSettings, transform: Box<dyn SpectralTransform>) -> Self {
        Self { settings, transform }
    }

    pub fn with_defaults(settings: VocalSettings) -> Self {
        Self::new(settings, Box::new(FftSpectrum::new()))
    }

    /// Decide whether `samples` contain vocals; never fails, degrades to false
    pub fn detect(&self, samples: &[f32], sample_rate: u32) -> Outcome<bool> {
        let outcome = Outcome::contain(self.try_detect(samples, sample_rate), false);
        match &outcome {
            Outcome::Measured(has_vocals) => debug!("Vocals: {}", has_vocals),
            Outcome::Degraded { value, reason } => {
                warn!("Vocal detection failed, using default {}: {}", value, reason)
            }
        }
        outcome
    }

    fn try_detect(&self, samples: &[f32], sample_rate: u32) -> Result<bool> {
        let frame_size = self.settings.frame_size;
        let freqs = self.transform.frequency_bins(frame_size, sample_rate);

        let mut ratios = Vec::with_capacity(self.settings.max_frames);
        // Every frame is transformed so a failure anywhere degrades the result;
        // only the first `max_frames` ratios are averaged.
        for start in leading_frame_starts(samples.len(), frame_size, self.settings.hop_size) {
            let power = self.band_power(&samples[start..start + frame_size], &freqs)?;
            match power.ratio() {
                Some(ratio) if ratios.len() < self.settings.max_frames => ratios.push(ratio),
                Some(_) => {}
                None => trace!("Skipping frame at {}: no power above sub-bass", start),
            }
        }

        if ratios.is_empty() {
            debug!("No qualifying vocal frames in {} samples", samples.len());
            return Ok(false);
        }

        let mean = ratios.iter().sum::<f64>() / ratios.len() as f64;
        debug!("Vocal band ratio {:.3} over {} frames", mean, ratios.len());
        Ok(mean > self.settings.ratio_threshold)
    }

    fn band_power(&self, frame: &[f32], freqs: &[f32]) -> Result<BandPower> {
        let spectrum = self.transform.forward_real(frame)?;
        let (low_hz, high_hz) = (self.settings.band_low_hz, self.settings.band_high_hz);

        let mut power = BandPower::default();
        for (bin, &freq) in spectrum.iter().zip(freqs) {
            let p = bin.norm_sqr() as f64;
            power.total += p;
            if freq < low_hz {
                power.low += p;
            } else if freq <= high_hz {
                power.vocal += p;
            }
        }
        Ok(power)
    }
}
