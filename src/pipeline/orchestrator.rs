//! Pipeline orchestration
//!
//! Decodes one file and runs tempo, key, energy and vocal analysis over the
//! shared signal. Tempo and key failures abort the run; energy and vocal
//! failures fall back to their defaults.

use crate::analysis::{EnergyNormalizer, KeyAnalyzer, TempoConsensus, VocalBandClassifier};
use crate::audio;
use crate::config::Settings;
use crate::error::Result;
use crate::pipeline::LogContext;
use crate::types::{AnalysisReport, Signal};
use std::path::Path;
use tracing::{debug, info, info_span};

/// Single-file analyzer
///
/// Holds the analysis components and the logging context. Every call to
/// [`Analyzer::analyze_file`] or [`Analyzer::analyze_signal`] is independent.
pub struct Analyzer {
    settings: Settings,
    tempo: TempoConsensus,
    key: KeyAnalyzer,
    energy: EnergyNormalizer,
    vocals: VocalBandClassifier,
    log: LogContext,
}

impl Analyzer {
    /// Analyzer with the default components, after validating `settings`
    pub fn new(settings: Settings, log: LogContext) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            tempo: TempoConsensus::with_defaults(settings.tempo.clone()),
            key: KeyAnalyzer::with_defaults(settings.fallback_key),
            energy: EnergyNormalizer::with_defaults(settings.energy.clone()),
            vocals: VocalBandClassifier::with_defaults(settings.vocals.clone()),
            settings,
            log,
        })
    }

    /// Analyzer with caller-supplied components
    pub fn with_components(
        settings: Settings,
        tempo: TempoConsensus,
        key: KeyAnalyzer,
        energy: EnergyNormalizer,
        vocals: VocalBandClassifier,
        log: LogContext,
    ) -> Self {
        Self {
            settings,
            tempo,
            key,
            energy,
            vocals,
            log,
        }
    }

    /// Decode and analyze the file at `path`
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisReport> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.log.scope(|| {
            let span = info_span!("analyze", file = %name);
            let _enter = span.enter();

            let signal = audio::decode(path, self.settings.sample_rate)?;
            info!(
                "Decoded {:.2}s at {} Hz",
                signal.duration(),
                signal.sample_rate()
            );
            AnalysisRun::start(self, &signal).finish()
        })
    }

    /// Analyze an already decoded signal
    pub fn analyze_signal(&self, signal: &Signal) -> Result<AnalysisReport> {
        self.log.scope(|| {
            let span = info_span!("analyze", file = "<signal>");
            let _enter = span.enter();
            AnalysisRun::start(self, signal).finish()
        })
    }
}

/// One in-flight analysis; consumed to produce its report
struct AnalysisRun<'a> {
    analyzer: &'a Analyzer,
    signal: &'a Signal,
}

impl<'a> AnalysisRun<'a> {
    fn start(analyzer: &'a Analyzer, signal: &'a Signal) -> Self {
        debug!("Analyzing {} samples", signal.len());
        Self { analyzer, signal }
    }

    fn finish(self) -> Result<AnalysisReport> {
        let Self { analyzer, signal } = self;

        let tempo = analyzer.tempo.estimate(signal)?;
        let key = analyzer.key.analyze(signal)?;
        let energy = analyzer.energy.score(signal.samples());
        let vocals = analyzer.vocals.detect(signal.samples(), signal.sample_rate());

        let report = AnalysisReport {
            bpm: tempo.bpm,
            key: key.label.to_string(),
            energy: energy.into_value(),
            has_vocals: vocals.into_value(),
            bpm_confidence: tempo.confidence,
            key_confidence: key.strength,
        };

        info!(
            "Analyzed: BPM={}, Key={}, Energy={}, Vocals={}",
            report.bpm, report.key, report.energy, report.has_vocals
        );

        Ok(report)
    }
}
