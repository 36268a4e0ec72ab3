//! Onset strength envelope
//!
//! Half-wave rectified spectral flux over log-compressed magnitudes. The
//! envelope peaks where new energy appears, which is what the tempo
//! autocorrelation looks for.

use crate::analysis::spectrum::for_each_stft_frame;

/// STFT window for onset detection
pub const ONSET_FRAME_SIZE: usize = 2048;

/// Hop between onset frames (~11.6 ms at 44.1 kHz)
pub const ONSET_HOP_SIZE: usize = 512;

/// Magnitude compression factor: log(1 + GAMMA * |X|)
const GAMMA: f32 = 100.0;

/// Compute the onset envelope of `samples`, one value per hop
///
/// The first frame has no predecessor and is reported as 0.0. Returns an
/// empty envelope for input shorter than one frame.
pub fn onset_envelope(samples: &[f32]) -> Vec<f32> {
    let mut envelope = Vec::new();
    let mut prev: Vec<f32> = Vec::new();
    let mut curr: Vec<f32> = Vec::new();

    for_each_stft_frame(samples, ONSET_FRAME_SIZE, ONSET_HOP_SIZE, |magnitudes| {
        curr.clear();
        curr.extend(magnitudes.iter().map(|&m| (1.0 + GAMMA * m).ln()));

        if prev.is_empty() {
            envelope.push(0.0);
        } else {
            let flux: f32 = curr
                .iter()
                .zip(&prev)
                .map(|(&c, &p)| (c - p).max(0.0))
                .sum();
            envelope.push(flux / curr.len() as f32);
        }
        std::mem::swap(&mut prev, &mut curr);
    });
    envelope
}

/// Duration of one envelope frame in seconds
pub fn frame_duration(sample_rate: u32) -> f32 {
    ONSET_HOP_SIZE as f32 / sample_rate as f32
}
