//! Summary statistics over checked links
//!
//! This module derives the report counts from the record list and prints
//! them to stdout at the end of a run.

use crate::state::LinkRecord;
use serde::Serialize;

/// Crawl summary counts
///
/// `successful`, `broken` and `errored` partition the records except for
/// 3xx responses that were not followed (e.g. `304`), which count toward
/// `total` only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    /// Number of records
    pub total: usize,

    /// Records with a 2xx status
    pub successful: usize,

    /// Records with a status of 400 or above
    pub broken: usize,

    /// Records that never produced an HTTP response
    pub errored: usize,

    /// Records that followed at least one redirect
    pub redirected: usize,
}

impl CrawlSummary {
    /// Computes the summary of a record list
    pub fn from_records(records: &[LinkRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            if record.status.is_ok() {
                summary.successful += 1;
            }
            if record.status.is_broken() {
                summary.broken += 1;
            }
            if record.status.is_error() {
                summary.errored += 1;
            }
            if record.was_redirected() {
                summary.redirected += 1;
            }
        }

        summary
    }

    /// Returns true if any link is broken or could not be checked
    pub fn has_failures(&self) -> bool {
        self.broken + self.errored > 0
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.successful as f64 / self.total as f64) * 100.0
    }

    /// Returns the broken-or-errored rate as a percentage
    pub fn error_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        ((self.broken + self.errored) as f64 / self.total as f64) * 100.0
    }
}

/// Prints the summary to stdout in a formatted manner
pub fn print_statistics(summary: &CrawlSummary) {
    println!("=== Link Check Summary ===\n");
    println!("  Total links checked: {}", summary.total);
    println!("  Successful (2xx):    {}", summary.successful);
    println!("  Broken (4xx/5xx):    {}", summary.broken);
    println!("  Errors:              {}", summary.errored);
    println!("  Redirected:          {}", summary.redirected);
    println!();
    println!(
        "Success Rate: {:.1}% ({} / {} links)",
        summary.success_rate(),
        summary.successful,
        summary.total
    );
}
