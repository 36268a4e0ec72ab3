//! Audio analysis modules
//!
//! This module provides traits for analysis backends and concrete implementations.
//! The trait abstraction allows swapping backends without changing pipeline code.
//!
//! Tempo and key analyses return `Result` and abort the run on failure;
//! energy and vocal analyses return [`Outcome`](crate::error::Outcome) and
//! always produce a value.

pub mod energy;
pub mod key;
pub mod spectrum;
pub mod tempo;
pub mod traits;
pub mod vocals;

pub use traits::{
    FrameEnergy, KeyExtractor, SegmentTempoEstimator, SpectralTransform, WholeTrackTempoEstimator,
};

pub use energy::{EnergyNormalizer, SquaredSumEnergy};
pub use key::camelot::{compatible_labels, harmonic_label};
pub use key::{ChromaKeyExtractor, KeyAnalyzer};
pub use spectrum::FftSpectrum;
pub use tempo::{fold_tempo, AutocorrelationTempo, BeatTrackingTempo, TempoConsensus};
pub use vocals::VocalBandClassifier;
