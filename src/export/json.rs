//! JSON output of the analysis report
//!
//! The report is written as one compact line so the binary's stdout can be
//! consumed line by line.

use crate::error::Result;
use crate::types::AnalysisReport;
use std::io::Write;
use tracing::debug;

/// Serialize a report as a single compact JSON line (no trailing newline)
pub fn to_json_line(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}

/// Write a report followed by a newline, then flush
pub fn write_report<W: Write>(report: &AnalysisReport, mut writer: W) -> Result<()> {
    let line = to_json_line(report)?;
    writeln!(writer, "{}", line)?;
    writer.flush()?;
    debug!("Wrote report ({} bytes)", line.len() + 1);
    Ok(())
}
