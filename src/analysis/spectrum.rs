//! FFT helpers shared by the spectral analyses
//!
//! `FftSpectrum` is the default [`SpectralTransform`]: an unwindowed real
//! forward FFT. The STFT helper is used by the onset envelope and the chroma
//! key extractor, which both want Hann-windowed magnitudes.

use crate::analysis::traits::SpectralTransform;
use crate::error::{AnalyzerError, Result};
use rustfft::{num_complex::Complex, FftPlanner};
use std::sync::Mutex;

/// Real forward FFT backed by rustfft
///
/// The planner caches plans per frame size, so one instance can serve every
/// frame of an analysis.
pub struct FftSpectrum {
    planner: Mutex<FftPlanner<f32>>,
}

impl FftSpectrum {
    pub fn new() -> Self {
        Self {
            planner: Mutex::new(FftPlanner::new()),
        }
    }
}

impl Default for FftSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralTransform for FftSpectrum {
    fn forward_real(&self, frame: &[f32]) -> Result<Vec<Complex<f32>>> {
        if frame.is_empty() {
            return Err(AnalyzerError::analysis("cannot transform an empty frame"));
        }

        let fft = self
            .planner
            .lock()
            .map_err(|_| AnalyzerError::analysis("FFT planner lock poisoned"))?
            .plan_fft_forward(frame.len());

        let mut buffer: Vec<Complex<f32>> = frame.iter().map(|&s| Complex::new(s, 0.0)).collect();
        fft.process(&mut buffer);
        buffer.truncate(frame.len() / 2 + 1);
        Ok(buffer)
    }
}

/// Periodic Hann window of `size` samples
pub fn hann_window(size: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}

/// Start offsets of every full frame of `frame_size` samples, `hop` apart
pub fn frame_starts(len: usize, frame_size: usize, hop: usize) -> impl Iterator<Item = usize> {
    let last = if len >= frame_size { len - frame_size + 1 } else { 0 };
    (0..last).step_by(hop.max(1))
}

/// Start offsets `0, hop, 2 * hop, ...` strictly below `len - frame_size`
///
/// The final full frame is never visited. Energy and vocal framing use this
/// rule; the STFT helpers use [`frame_starts`].
pub fn leading_frame_starts(
    len: usize,
    frame_size: usize,
    hop: usize,
) -> impl Iterator<Item = usize> {
    (0..len.saturating_sub(frame_size)).step_by(hop.max(1))
}

/// Visit the Hann-windowed magnitudes of every full frame, in order
///
/// `visit` receives the `frame_size / 2 + 1` bin magnitudes of one frame.
/// The slice is reused between calls, so only one frame is held at a time.
/// Returns the number of frames visited.
pub fn for_each_stft_frame(
    samples: &[f32],
    frame_size: usize,
    hop: usize,
    mut visit: impl FnMut(&[f32]),
) -> usize {
    if frame_size == 0 {
        return 0;
    }
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(frame_size);
    let window = hann_window(frame_size);
    let bins = frame_size / 2 + 1;

    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];
    let mut magnitudes = vec![0.0f32; bins];
    let mut frames = 0;
    for start in frame_starts(samples.len(), frame_size, hop) {
        let frame = &samples[start..start + frame_size];
        for ((slot, &s), &w) in buffer.iter_mut().zip(frame).zip(&window) {
            *slot = Complex::new(s * w, 0.0);
        }
        fft.process(&mut buffer);
        for (m, c) in magnitudes.iter_mut().zip(&buffer[..bins]) {
            *m = c.norm();
        }
        visit(&magnitudes);
        frames += 1;
    }
    frames
}
