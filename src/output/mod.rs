//! Output module for summaries and report files
//!
//! This module handles:
//! - Summary counts over the checked links
//! - HTML, CSV and JSON report writers behind one `OutputHandler` trait
//! - Writing the configured set of reports in one call

mod csv;
mod html;
mod json;
pub mod stats;
mod traits;

pub use self::csv::{records_to_csv, CsvReport, CSV_COLUMNS};
pub use html::{escape_html, HtmlReport};
pub use json::{JsonReport, JSON_REPORT_FILE};
pub use stats::{print_statistics, CrawlSummary};
pub use traits::{OutputError, OutputHandler, OutputResult, ReportMeta};

use crate::state::LinkRecord;
use std::path::{Path, PathBuf};

/// Returns the handler for a format name
///
/// # Returns
///
/// * `Ok(handler)` - One of `html`, `json`, `csv`
/// * `Err(OutputError::Format)` - Unknown format name
pub fn handler_for(format: &str) -> OutputResult<Box<dyn OutputHandler>> {
    match format.to_ascii_lowercase().as_str() {
        "html" => Ok(Box::new(HtmlReport)),
        "json" => Ok(Box::new(JsonReport)),
        "csv" => Ok(Box::new(CsvReport)),
        other => Err(OutputError::Format(format!(
            "Unsupported report format: {}",
            other
        ))),
    }
}

/// Writes one report per format under `dir`
///
/// # Arguments
///
/// * `dir` - Report directory (created if missing)
/// * `formats` - Format names, written in order
/// * `records` - Every checked link
/// * `meta` - Run metadata
///
/// # Returns
///
/// The paths of the written files, in format order
pub fn write_reports(
    dir: &Path,
    formats: &[String],
    records: &[LinkRecord],
    meta: &ReportMeta,
) -> OutputResult<Vec<PathBuf>> {
    let summary = CrawlSummary::from_records(records);
    let mut written = Vec::with_capacity(formats.len());

    for format in formats {
        let handler = handler_for(format)?;
        let path = handler.write(dir, records, &summary, meta)?;
        tracing::info!("Saved {} report to {}", handler.format_name(), path.display());
        written.push(path);
    }

    Ok(written)
}
