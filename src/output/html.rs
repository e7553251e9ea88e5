//! HTML report writer
//!
//! Produces a self-contained page: summary counts, one table row per record
//! and the CSV export embedded for download. Rows are classed `trusted`
//! (.gov/.edu hosts) or `internal` (same host as the page the link was found
//! on) for styling.

use crate::output::csv::records_to_csv;
use crate::output::stats::CrawlSummary;
use crate::output::traits::{OutputError, OutputHandler, OutputResult, ReportMeta};
use crate::state::LinkRecord;
use crate::url::classify_link;
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 2rem; color: #222; }
h1 { font-size: 1.5rem; }
.summary { display: flex; gap: 1.5rem; margin-bottom: 1.5rem; }
.summary div { padding: 0.5rem 1rem; border-radius: 4px; background: #f3f3f3; }
table { border-collapse: collapse; width: 100%; font-size: 0.9rem; }
th, td { border: 1px solid #ddd; padding: 0.4rem 0.6rem; text-align: left; vertical-align: top; }
th { background: #fafafa; }
td.url { word-break: break-all; }
tr.trusted { background: #eef7ee; }
tr.internal { background: #eef2fb; }
.status-ok { color: #1a7f37; }
.status-broken { color: #cf222e; font-weight: bold; }
.status-error { color: #9a6700; font-weight: bold; }
"#;

const DOWNLOAD_SCRIPT: &str = r#"
function downloadCsv() {
  const data = document.getElementById("csv-data").value;
  const blob = new Blob([data], { type: "text/csv;charset=utf-8" });
  const link = document.createElement("a");
  link.href = URL.createObjectURL(blob);
  link.download = document.getElementById("csv-data").dataset.filename;
  link.click();
  URL.revokeObjectURL(link.href);
}
"#;

/// Writes `link_report_<timestamp>.html`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlReport;

impl OutputHandler for HtmlReport {
    fn format_name(&self) -> &'static str {
        "html"
    }

    fn file_name(&self, meta: &ReportMeta) -> String {
        format!("link_report_{}.html", meta.file_stamp())
    }

    fn render(
        &self,
        records: &[LinkRecord],
        summary: &CrawlSummary,
        meta: &ReportMeta,
    ) -> OutputResult<String> {
        let csv = records_to_csv(records)?;
        render_html(records, summary, meta, &csv).map_err(|e| OutputError::Format(e.to_string()))
    }
}

fn render_html(
    records: &[LinkRecord],
    summary: &CrawlSummary,
    meta: &ReportMeta,
    csv: &str,
) -> Result<String, std::fmt::Error> {
    let mut html = String::with_capacity(4096 + records.len() * 512);
    let generated = meta.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(
        html,
        "<title>Link Report - {}</title>",
        escape_html(&meta.start_url)
    )?;
    writeln!(html, "<style>{}</style>\n</head>\n<body>", STYLE)?;

    writeln!(html, "<h1>Link Report for {}</h1>", escape_html(&meta.start_url))?;
    write!(html, "<p>Generated {}", escape_html(&generated))?;
    if let Some(hash) = &meta.config_hash {
        write!(html, " &middot; config <code>{}</code>", escape_html(hash))?;
    }
    writeln!(html, "</p>")?;

    writeln!(html, "<div class=\"summary\">")?;
    writeln!(html, "<div>Total: <strong>{}</strong></div>", summary.total)?;
    writeln!(html, "<div>Successful: <strong>{}</strong></div>", summary.successful)?;
    writeln!(html, "<div>Broken: <strong>{}</strong></div>", summary.broken)?;
    writeln!(html, "<div>Errors: <strong>{}</strong></div>", summary.errored)?;
    writeln!(html, "<div>Redirected: <strong>{}</strong></div>", summary.redirected)?;
    writeln!(html, "</div>")?;

    writeln!(
        html,
        "<p><button type=\"button\" onclick=\"downloadCsv()\">Download CSV</button></p>"
    )?;

    writeln!(html, "<table>\n<thead><tr>")?;
    for heading in [
        "Status",
        "URL",
        "Note",
        "Source Type",
        "Source URL",
        "Final URL",
        "Redirects",
    ] {
        write!(html, "<th>{}</th>", heading)?;
    }
    writeln!(html, "</tr></thead>\n<tbody>")?;

    for record in records {
        let class = classify_link(&record.url, &record.source_url).css_class();
        if class.is_empty() {
            write!(html, "<tr>")?;
        } else {
            write!(html, "<tr class=\"{}\">", class)?;
        }

        write!(
            html,
            "<td class=\"{}\">{}</td>",
            status_class(record),
            record.status
        )?;
        write!(
            html,
            "<td class=\"url\"><a href=\"{0}\">{0}</a></td>",
            escape_html(&record.url)
        )?;
        write!(html, "<td>{}</td>", escape_html(&record.note))?;
        write!(html, "<td>{}</td>", record.source_type)?;
        write!(html, "<td class=\"url\">{}</td>", escape_html(&record.source_url))?;
        write!(html, "<td class=\"url\">{}</td>", escape_html(&record.final_url))?;
        writeln!(html, "<td>{}</td></tr>", record.redirect_count)?;
    }

    writeln!(html, "</tbody>\n</table>")?;

    writeln!(
        html,
        "<textarea id=\"csv-data\" data-filename=\"link_report_{}.csv\" hidden readonly>{}</textarea>",
        escape_html(&meta.file_stamp()),
        escape_html(csv)
    )?;
    writeln!(html, "<script>{}</script>", DOWNLOAD_SCRIPT)?;
    writeln!(html, "</body>\n</html>")?;

    Ok(html)
}

fn status_class(record: &LinkRecord) -> &'static str {
    if record.status.is_error() {
        "status-error"
    } else if record.status.is_broken() {
        "status-broken"
    } else {
        "status-ok"
    }
}

/// Escapes text for use in HTML content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
