//! Output handler traits and types
//!
//! This module defines the trait interface for report writers and the
//! metadata every report carries.

use crate::output::stats::CrawlSummary;
use crate::state::LinkRecord;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Facts about the run that produced a report
#[derive(Debug, Clone)]
pub struct ReportMeta {
    /// When the report was generated
    pub generated_at: DateTime<Local>,

    /// The page the crawl started from
    pub start_url: String,

    /// SHA-256 of the configuration file, if one was used
    pub config_hash: Option<String>,
}

impl ReportMeta {
    /// Creates report metadata stamped with the current time
    pub fn new(start_url: impl Into<String>, config_hash: Option<String>) -> Self {
        Self {
            generated_at: Local::now(),
            start_url: start_url.into(),
            config_hash,
        }
    }

    /// Timestamp used in report file names
    pub fn file_stamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d_%H-%M-%S").to_string()
    }
}

/// Trait for report writers
///
/// Each handler turns the record list into one file. Implementations only
/// need to name the file and render its contents.
pub trait OutputHandler {
    /// Format name as used in the `formats` configuration list
    fn format_name(&self) -> &'static str;

    /// File name of the report, relative to the report directory
    fn file_name(&self, meta: &ReportMeta) -> String;

    /// Renders the report contents
    ///
    /// # Arguments
    ///
    /// * `records` - Every checked link, in crawl order
    /// * `summary` - Counts derived from `records`
    /// * `meta` - Run metadata
    fn render(
        &self,
        records: &[LinkRecord],
        summary: &CrawlSummary,
        meta: &ReportMeta,
    ) -> OutputResult<String>;

    /// Renders the report and writes it under `dir`
    ///
    /// # Returns
    ///
    /// The path of the written file
    fn write(
        &self,
        dir: &Path,
        records: &[LinkRecord],
        summary: &CrawlSummary,
        meta: &ReportMeta,
    ) -> OutputResult<PathBuf> {
        let contents = self.render(records, summary, meta)?;
        fs::create_dir_all(dir)?;

        let path = dir.join(self.file_name(meta));
        fs::write(&path, contents)?;

        tracing::debug!("Wrote {} report to {}", self.format_name(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct PlainHandler;

    impl OutputHandler for PlainHandler {
        fn format_name(&self) -> &'static str {
            "plain"
        }

        fn file_name(&self, meta: &ReportMeta) -> String {
            format!("plain_{}.txt", meta.file_stamp())
        }

        fn render(
            &self,
            records: &[LinkRecord],
            summary: &CrawlSummary,
            _meta: &ReportMeta,
        ) -> OutputResult<String> {
            Ok(format!("{} {}", records.len(), summary.total))
        }
    }

    fn create_test_meta() -> ReportMeta {
        ReportMeta {
            generated_at: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
            start_url: "https://example.test/".to_string(),
            config_hash: None,
        }
    }

    #[test]
    fn test_file_stamp() {
        assert_eq!(create_test_meta().file_stamp(), "2024-03-09_14-05-07");
    }

    #[test]
    fn test_default_write_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports").join("today");

        let path = PlainHandler
            .write(&nested, &[], &CrawlSummary::default(), &create_test_meta())
            .unwrap();

        assert_eq!(path, nested.join("plain_2024-03-09_14-05-07.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "0 0");
    }
}
