//! CSV report writer

use crate::output::stats::CrawlSummary;
use crate::output::traits::{OutputError, OutputHandler, OutputResult, ReportMeta};
use crate::state::LinkRecord;

/// Column names of the CSV report, in order
pub const CSV_COLUMNS: [&str; 7] = [
    "URL",
    "Status",
    "Note",
    "SourceType",
    "SourceURL",
    "FinalURL",
    "RedirectCount",
];

/// Writes `link_report_<timestamp>.csv`
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReport;

impl OutputHandler for CsvReport {
    fn format_name(&self) -> &'static str {
        "csv"
    }

    fn file_name(&self, meta: &ReportMeta) -> String {
        format!("link_report_{}.csv", meta.file_stamp())
    }

    fn render(
        &self,
        records: &[LinkRecord],
        _summary: &CrawlSummary,
        _meta: &ReportMeta,
    ) -> OutputResult<String> {
        records_to_csv(records)
    }
}

/// Formats records as CSV with a header row and CRLF line endings
///
/// Also embedded in the HTML report as a download.
pub fn records_to_csv(records: &[LinkRecord]) -> OutputResult<String> {
    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::CRLF)
        .from_writer(Vec::with_capacity(records.len() * 128));

    writer.write_record(CSV_COLUMNS)?;
    for record in records {
        writer.write_record([
            record.url.as_str(),
            record.status.to_string().as_str(),
            record.note.as_str(),
            record.source_type.to_string().as_str(),
            record.source_url.as_str(),
            record.final_url.as_str(),
            record.redirect_count.to_string().as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Format(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| OutputError::Format(e.to_string()))
}
