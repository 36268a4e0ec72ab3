//! Export of analysis results

pub mod json;

pub use json::{to_json_line, write_report};
