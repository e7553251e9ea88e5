//! JSON report writer
//!
//! Writes `link_info.json`: run metadata, the summary counts and every
//! record. Statuses serialize as the number or `"ERROR"`.

use crate::output::stats::CrawlSummary;
use crate::output::traits::{OutputHandler, OutputResult, ReportMeta};
use crate::state::LinkRecord;
use serde::Serialize;

/// File name of the JSON report
pub const JSON_REPORT_FILE: &str = "link_info.json";

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    generated_at: String,
    start_url: &'a str,
    config_hash: Option<&'a str>,
    summary: &'a CrawlSummary,
    links: &'a [LinkRecord],
}

/// Writes the JSON report
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReport;

impl OutputHandler for JsonReport {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn file_name(&self, _meta: &ReportMeta) -> String {
        JSON_REPORT_FILE.to_string()
    }

    fn render(
        &self,
        records: &[LinkRecord],
        summary: &CrawlSummary,
        meta: &ReportMeta,
    ) -> OutputResult<String> {
        let document = JsonDocument {
            generated_at: meta.generated_at.to_rfc3339(),
            start_url: &meta.start_url,
            config_hash: meta.config_hash.as_deref(),
            summary,
            links: records,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LinkStatus, SourceType, ValidationOutcome};

    #[test]
    fn test_render_document() {
        let redirected = ValidationOutcome {
            url: "https://example.test/old".to_string(),
            status: LinkStatus::Http(200),
            note: "OK".to_string(),
            final_url: "https://example.test/new".to_string(),
            redirect_count: 1,
            redirect_chain: vec![
                "https://example.test/old".to_string(),
                "https://example.test/new".to_string(),
            ],
        };
        let records = vec![
            LinkRecord::new(redirected, SourceType::Anchor, "https://example.test/"),
            LinkRecord::new(
                ValidationOutcome::failed("https://down.test/", "ReadTimeout"),
                SourceType::Form,
                "https://example.test/",
            ),
        ];
        let summary = CrawlSummary::from_records(&records);
        let meta = ReportMeta::new("https://example.test/", Some("abc123".to_string()));

        let rendered = JsonReport.render(&records, &summary, &meta).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["start_url"], "https://example.test/");
        assert_eq!(value["config_hash"], "abc123");
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["redirected"], 1);
        assert_eq!(value["summary"]["errored"], 1);
        assert_eq!(value["links"][0]["status_code"], 200);
        assert_eq!(value["links"][0]["redirect_count"], 1);
        assert_eq!(value["links"][1]["status_code"], "ERROR");
        assert_eq!(value["links"][1]["source_type"], "form");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_missing_config_hash_is_null() {
        let meta = ReportMeta::new("https://example.test/", None);
        let rendered = JsonReport
            .render(&[], &CrawlSummary::default(), &meta)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(value["config_hash"].is_null());
        assert_eq!(value["links"].as_array().unwrap().len(), 0);
    }
}
