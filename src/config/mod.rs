//! Configuration and CLI handling

pub mod cli;
pub mod settings;

pub use cli::{Cli, Command};
pub use settings::{EnergySettings, Settings, TempoSettings, VocalSettings, ANALYSIS_SAMPLE_RATE};
