//! Audio decoding using symphonia
//!
//! Decodes audio files to mono f32 samples at the analysis sample rate.
//! Uses rubato for resampling with proper anti-aliasing.

use crate::error::{AnalyzerError, Result};
use crate::types::{AudioFormat, Signal};
use rubato::{FftFixedInOut, Resampler};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, trace};

/// Maximum file size we'll attempt to decode (2GB)
/// Prevents OOM on extremely large files
const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Input chunk size handed to rubato
const RESAMPLE_CHUNK: usize = 1024;

/// Decode an audio file to a mono [`Signal`] at `target_rate`
pub fn decode(path: &Path, target_rate: u32) -> Result<Signal> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnalyzerError::FileNotFound(path.to_path_buf()),
        _ => AnalyzerError::decode_error(path, format!("Failed to read file metadata: {}", e)),
    })?;

    if !metadata.is_file() {
        return Err(AnalyzerError::decode_error(path, "Not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(AnalyzerError::EmptyFile(path.to_path_buf()));
    }
    if metadata.len() > MAX_FILE_SIZE {
        return Err(AnalyzerError::decode_error(
            path,
            format!(
                "File too large ({:.1} GB). Maximum supported size is 2 GB.",
                metadata.len() as f64 / (1024.0 * 1024.0 * 1024.0)
            ),
        ));
    }

    let file = std::fs::File::open(path)
        .map_err(|e| AnalyzerError::decode_error(path, format!("Failed to open file: {}", e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Provide a hint based on file extension
    let mut hint = Hint::new();
    let extension = path.extension().and_then(|e| e.to_str());
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| match extension {
            Some(ext) if AudioFormat::from_extension(ext).is_none() => {
                AnalyzerError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: ext.to_string(),
                }
            }
            _ => AnalyzerError::decode_error(path, format!("Failed to probe format: {}", e)),
        })?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AnalyzerError::decode_error(path, "No audio tracks found"))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let source_rate = codec_params.sample_rate.unwrap_or(target_rate);

    debug!(
        "Decoding: {} @ {}Hz, {} channels",
        path.display(),
        source_rate,
        codec_params.channels.map(|c| c.count()).unwrap_or(0)
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| AnalyzerError::decode_error(path, format!("Failed to create decoder: {}", e)))?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break; // End of stream
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AnalyzerError::decode_error(
                    path,
                    format!("Failed to read packet: {}", e),
                ));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                trace!("Skipping corrupted frame: {}", e);
                continue;
            }
            Err(e) => {
                return Err(AnalyzerError::decode_error(path, format!("Decode error: {}", e)));
            }
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        mono.extend(to_mono(sample_buf.samples(), channels));
    }

    if mono.is_empty() {
        return Err(AnalyzerError::decode_error(path, "File contains no audio samples"));
    }

    let samples = if source_rate != target_rate {
        resample(&mono, source_rate, target_rate)
    } else {
        mono
    };

    debug!(
        "Decoded {} samples ({:.2}s)",
        samples.len(),
        samples.len() as f64 / target_rate as f64
    );

    Ok(Signal::new(samples, target_rate))
}

/// Convert interleaved multi-channel audio to mono by averaging channels
fn to_mono(samples: &[f32], channels: usize) -> impl Iterator<Item = f32> + '_ {
    samples
        .chunks(channels)
        .map(move |frame| frame.iter().sum::<f32>() / frame.len() as f32)
}

/// FFT-based resampling via rubato, with a linear fallback if rubato refuses
/// the rate pair or fails mid-stream
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let mut resampler =
        match FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, RESAMPLE_CHUNK, 1) {
            Ok(r) => r,
            Err(e) => {
                debug!("Rubato initialization failed ({}), using linear fallback", e);
                return resample_linear(samples, from_rate, to_rate);
            }
        };

    let chunk_in = resampler.input_frames_next();
    let chunk_out = resampler.output_frames_next();
    let ratio = to_rate as f64 / from_rate as f64;
    let mut output = Vec::with_capacity((samples.len() as f64 * ratio).ceil() as usize);

    for (index, chunk) in samples.chunks(chunk_in).enumerate() {
        let mut block = chunk.to_vec();
        block.resize(chunk_in, 0.0);
        let input = vec![block];

        match resampler.process(&input, None) {
            Ok(resampled) => {
                if let Some(channel) = resampled.first() {
                    // The zero-padded tail only yields as many frames as real input warrants
                    let valid = if chunk.len() < chunk_in {
                        ((chunk.len() as f64 * ratio).ceil() as usize).min(chunk_out)
                    } else {
                        chunk_out
                    };
                    output.extend_from_slice(&channel[..valid.min(channel.len())]);
                }
            }
            Err(e) => {
                debug!("Rubato processing error ({}), linear fallback for remainder", e);
                output.extend(resample_linear(&samples[index * chunk_in..], from_rate, to_rate));
                break;
            }
        }
    }

    output
}

/// Linear interpolation resampler; may alias, only used as a fallback
fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let step = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / step) as usize;
    let last = samples.len() - 1;

    (0..output_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            if idx < last {
                samples[idx] * (1.0 - frac) + samples[idx + 1] * frac
            } else {
                samples[idx.min(last)]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_mono_stereo() {
        let stereo = vec![0.5, 0.3, 0.8, 0.2, 1.0, 0.0];
        let mono: Vec<f32> = to_mono(&stereo, 2).collect();
        assert_eq!(mono.len(), 3);
        assert!((mono[0] - 0.4).abs() < 0.001);
        assert!((mono[1] - 0.5).abs() < 0.001);
        assert!((mono[2] - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_to_mono_already_mono() {
        let mono = vec![0.5, 0.8, 1.0];
        let result: Vec<f32> = to_mono(&mono, 1).collect();
        assert_eq!(result, mono);
    }

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.1, 0.2, 0.3, 0.4, 0.5];
        assert_eq!(resample(&samples, 44100, 44100), samples);
    }

    #[test]
    fn test_resample_upsample_from_22050() {
        let samples: Vec<f32> = (0..2205).map(|i| i as f32 / 2205.0).collect();
        let result = resample(&samples, 22050, 44100);
        assert!((result.len() as f64 - 4410.0).abs() < 10.0, "len {}", result.len());
    }

    #[test]
    fn test_resample_48k_sine_keeps_amplitude() {
        use std::f32::consts::PI;
        let samples: Vec<f32> = (0..48000)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 48000.0).sin())
            .collect();
        let result = resample(&samples, 48000, 44100);

        assert!((result.len() as f64 - 44100.0).abs() < 10.0);
        // Skip the resampler's settling region at the start
        let max = result[2048..].iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        assert!(max > 0.9, "max {} should be > 0.9", max);
    }

    #[test]
    fn test_resample_linear_length() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let result = resample_linear(&samples, 44100, 22050);
        assert!((result.len() as f64 - 50.0).abs() < 2.0);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = decode(Path::new("/nonexistent/audio.wav"), 44100).unwrap_err();
        assert!(matches!(err, AnalyzerError::FileNotFound(_)));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.wav");
        std::fs::File::create(&path).unwrap();
        let err = decode(&path, 44100).unwrap_err();
        assert!(matches!(err, AnalyzerError::EmptyFile(_)));
    }

    #[test]
    fn test_text_file_with_unknown_extension_is_unsupported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "This is not audio data, just plain text.\n".repeat(100)).unwrap();
        let err = decode(&path, 44100).unwrap_err();
        assert!(err.is_input_error());
    }
}
