//! Integration tests for the audio-analyzer pipeline
//!
//! These tests verify the full analysis pipeline produces correct output.

use audio_analyzer::analysis::{EnergyNormalizer, VocalBandClassifier};
use audio_analyzer::config::Settings;
use audio_analyzer::export;
use audio_analyzer::{Analyzer, AnalyzerError, LogContext};
use std::f32::consts::PI;
use std::path::Path;
use tempfile::TempDir;

fn wav_spec(channels: u16, sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    }
}

/// Write mono samples as a 16-bit WAV, duplicating them into every channel
fn write_wav(path: &Path, samples: &[f32], channels: u16, sample_rate: u32) {
    let mut writer =
        hound::WavWriter::create(path, wav_spec(channels, sample_rate)).expect("Failed to create WAV file");
    for &sample in samples {
        let sample_i16 = (sample.clamp(-1.0, 1.0) * 32767.0) as i16;
        for _ in 0..channels {
            writer.write_sample(sample_i16).expect("Failed to write sample");
        }
    }
    writer.finalize().expect("Failed to finalize WAV");
}

/// Deterministic full-range noise bytes (xorshift32)
fn noise_bytes(len: usize) -> Vec<u8> {
    let mut state = 0x9E37_79B9u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Impulses (short decaying bursts) at regular intervals matching `bpm`
fn click_track(bpm: f32, duration_secs: f32, sample_rate: u32) -> Vec<f32> {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let samples_per_beat = (60.0 / bpm * sample_rate as f32) as usize;

    // Impulse duration: ~5ms (short click)
    let impulse_samples = (0.005 * sample_rate as f32) as usize;

    (0..num_samples)
        .map(|i| {
            let position_in_beat = i % samples_per_beat;
            if position_in_beat < impulse_samples {
                // Exponential decay for a more natural click sound
                0.8 * (-5.0 * position_in_beat as f32 / impulse_samples as f32).exp()
            } else {
                0.0
            }
        })
        .collect()
}

/// C major I-IV-V-I, two seconds per chord, with a 120 BPM click on top
fn chord_progression(sample_rate: u32) -> Vec<f32> {
    const C_MAJOR: [f32; 3] = [261.63, 329.63, 392.00];
    const F_MAJOR: [f32; 3] = [349.23, 440.00, 523.25];
    const G_MAJOR: [f32; 3] = [392.00, 493.88, 587.33];

    let chord_len = 2 * sample_rate as usize;
    let mut samples = Vec::with_capacity(chord_len * 4);
    for chord in [C_MAJOR, F_MAJOR, G_MAJOR, C_MAJOR] {
        samples.extend((0..chord_len).map(|i| {
            let t = i as f32 / sample_rate as f32;
            chord.iter().map(|f| (2.0 * PI * f * t).sin()).sum::<f32>() * 0.15
        }));
    }

    let clicks = click_track(120.0, samples.len() as f32 / sample_rate as f32, sample_rate);
    for (s, c) in samples.iter_mut().zip(clicks) {
        *s += c * 0.4;
    }
    samples
}

fn analyzer() -> Analyzer {
    Analyzer::new(Settings::default(), LogContext::silent()).expect("default settings are valid")
}

/// Direct, half-time or double-time match
fn is_bpm_match(detected: f64, target: f64, tolerance: f64) -> bool {
    [target, target / 2.0, target * 2.0]
        .iter()
        .any(|t| (detected - t).abs() <= tolerance)
}

#[test]
fn test_bpm_detection_120_click_track() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("click_120.wav");
    write_wav(&path, &click_track(120.0, 15.0, 44100), 1, 44100);

    let report = analyzer().analyze_file(&path).expect("Analysis should succeed");

    assert!(
        is_bpm_match(report.bpm as f64, 120.0, 2.0),
        "Expected ~120 BPM (or half/double), got {}",
        report.bpm
    );
    assert!((0.0..=1.0).contains(&report.bpm_confidence));
}

#[test]
fn test_bpm_detection_various_tempos() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    for target_bpm in [90.0f32, 128.0, 140.0] {
        let path = dir.path().join(format!("click_{}.wav", target_bpm));
        write_wav(&path, &click_track(target_bpm, 15.0, 44100), 1, 44100);

        let report = analyzer().analyze_file(&path).expect("Analysis should succeed");
        assert!((80..160).contains(&report.bpm), "BPM {} out of range", report.bpm);
        assert!(
            is_bpm_match(report.bpm as f64, target_bpm as f64, 3.0),
            "Expected ~{} BPM, got {}",
            target_bpm,
            report.bpm
        );
    }
}

#[test]
fn test_key_detection_c_major_progression() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("progression.wav");
    write_wav(&path, &chord_progression(44100), 1, 44100);

    let report = analyzer().analyze_file(&path).expect("Analysis should succeed");

    // C major, or its relative minor
    assert!(
        report.key == "8B" || report.key == "8A",
        "Expected 8B or 8A, got {}",
        report.key
    );
    assert!(report.key_confidence > 0.0);
}

#[test]
fn test_report_fields_are_well_formed() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("progression.wav");
    write_wav(&path, &chord_progression(44100), 1, 44100);

    let report = analyzer().analyze_file(&path).expect("Analysis should succeed");
    let json: serde_json::Value =
        serde_json::from_str(&export::to_json_line(&report).unwrap()).unwrap();

    assert!(json["bpm"].is_u64());
    let key = json["key"].as_str().unwrap();
    assert!(key.ends_with('A') || key.ends_with('B'));
    let energy = json["energy"].as_u64().unwrap();
    assert!(energy <= 100);
    assert!(json["has_vocals"].is_boolean());
    let confidence = json["bpm_confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));
    assert!(json["key_confidence"].is_f64());
}

#[test]
fn test_analysis_is_idempotent() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("progression.wav");
    write_wav(&path, &chord_progression(44100), 1, 44100);

    let analyzer = analyzer();
    let first = export::to_json_line(&analyzer.analyze_file(&path).unwrap()).unwrap();
    let second = export::to_json_line(&analyzer.analyze_file(&path).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_stereo_input_matches_mono() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let samples = chord_progression(44100);
    let mono = dir.path().join("mono.wav");
    let stereo = dir.path().join("stereo.wav");
    write_wav(&mono, &samples, 1, 44100);
    write_wav(&stereo, &samples, 2, 44100);

    let analyzer = analyzer();
    let mono_report = analyzer.analyze_file(&mono).unwrap();
    let stereo_report = analyzer.analyze_file(&stereo).unwrap();
    assert_eq!(mono_report.bpm, stereo_report.bpm);
    assert_eq!(mono_report.key, stereo_report.key);
}

#[test]
fn test_48k_input_is_resampled() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("click_48k.wav");
    write_wav(&path, &click_track(120.0, 15.0, 48000), 1, 48000);

    let report = analyzer().analyze_file(&path).expect("Analysis should succeed");
    assert!(
        is_bpm_match(report.bpm as f64, 120.0, 2.0),
        "Expected ~120 BPM, got {}",
        report.bpm
    );
}

#[test]
fn test_loud_input_stays_in_range() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("loud.wav");
    // Clipped square wave at 220 Hz
    let samples: Vec<f32> = (0..44100 * 6)
        .map(|i| if (i / 100) % 2 == 0 { 1.0 } else { -1.0 })
        .collect();
    write_wav(&path, &samples, 1, 44100);

    let report = analyzer().analyze_file(&path).expect("Analysis should succeed");
    assert!(report.energy <= 100);
    assert!((80..160).contains(&report.bpm));
}

#[test]
fn test_silence_has_no_vocals_and_bounded_energy() {
    let settings = Settings::default();
    let silence = vec![0.0f32; 44100 * 5];

    let vocals = VocalBandClassifier::with_defaults(settings.vocals.clone());
    assert!(!vocals.detect(&silence, 44100).into_value());

    let energy = EnergyNormalizer::with_defaults(settings.energy.clone());
    assert!(energy.score(&silence).into_value() <= 100);
}

#[test]
fn test_handles_empty_audio_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("empty.wav");
    std::fs::File::create(&path).expect("Failed to create file");

    let err = analyzer().analyze_file(&path).unwrap_err();
    assert!(matches!(err, AnalyzerError::EmptyFile(_)));
}

#[test]
fn test_handles_invalid_audio_data() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("garbage.wav");
    std::fs::write(&path, noise_bytes(4096)).expect("Failed to write file");
    assert!(analyzer().analyze_file(&path).is_err());

    // Decoders may lock onto a stray sync word, but no report comes out
    let path = dir.path().join("garbage.mp3");
    std::fs::write(&path, noise_bytes(4096)).expect("Failed to write file");
    assert!(analyzer().analyze_file(&path).is_err());
}

#[test]
fn test_silent_file_fails_with_key_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("silence.wav");
    write_wav(&path, &vec![0.0; 44100 * 5], 1, 44100);

    let err = analyzer().analyze_file(&path).unwrap_err();
    assert!(matches!(err, AnalyzerError::KeyError { .. }), "unexpected error: {}", err);
    assert!(!err.is_input_error());
}

#[test]
fn test_handles_nonexistent_input_gracefully() {
    let err = analyzer()
        .analyze_file(Path::new("/nonexistent/path/track.mp3"))
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::FileNotFound(_)));
}
