//! Analysis pipeline: logging context and the single-file analyzer

mod context;
mod orchestrator;

pub use context::LogContext;
pub use orchestrator::Analyzer;
