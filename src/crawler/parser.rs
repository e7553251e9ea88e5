//! Document parser for extracting candidate links
//!
//! This module pulls link candidates out of fetched documents:
//! - `<a href="...">` anchors from HTML
//! - `<form action="...">` targets from HTML
//! - `<loc>` entries from sitemap XML (urlset or sitemapindex)
//!
//! Every value is resolved against the document URL. Results are
//! deduplicated and keep document order.

use crate::state::SourceType;
use crate::url::resolve_link;
use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Parses a document and extracts the links for one discovery kind
///
/// # Arguments
///
/// * `kind` - Which elements to extract (anchors, form actions, sitemap entries)
/// * `body` - The document text
/// * `base_url` - The URL the document was fetched from
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Absolute URLs, possibly empty
/// * `Err(String)` - The document could not be parsed (sitemaps only;
///   the HTML parser is error tolerant)
///
/// # Example
///
/// ```
/// use web_status_checker::crawler::parse_links;
/// use web_status_checker::SourceType;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = parse_links(SourceType::Anchor, html, &base_url).unwrap();
/// assert_eq!(links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_links(kind: SourceType, body: &str, base_url: &Url) -> Result<Vec<String>, String> {
    match kind {
        SourceType::Anchor => Ok(extract_anchors(body, base_url)),
        SourceType::Form => Ok(extract_form_actions(body, base_url)),
        SourceType::Sitemap => extract_sitemap_locs(body, base_url),
    }
}

/// Extracts every `<a href>` target from an HTML document
pub fn extract_anchors(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    select_attribute(&document, "a[href]", "href", base_url)
}

/// Extracts every `<form action>` target from an HTML document
pub fn extract_form_actions(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    select_attribute(&document, "form[action]", "action", base_url)
}

fn select_attribute(document: &Html, selector: &str, attr: &str, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let selector = match Selector::parse(selector) {
        Ok(s) => s,
        Err(_) => return links,
    };

    for element in document.select(&selector) {
        let Some(value) = element.value().attr(attr) else {
            continue;
        };

        // Same-document anchors point back at the page itself
        if value.trim_start().starts_with('#') {
            continue;
        }

        if let Some(absolute) = accept_link(value, base_url) {
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    }

    links
}

/// Extracts the text of every `<loc>` element from sitemap XML
pub fn extract_sitemap_locs(xml: &str, base_url: &Url) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut links = Vec::new();
    let mut seen = HashSet::new();
    let mut in_loc = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => in_loc = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => in_loc = false,
            Ok(Event::Text(text)) if in_loc => {
                let value = text.unescape().map_err(|e| e.to_string())?;
                if let Some(absolute) = accept_link(&value, base_url) {
                    if seen.insert(absolute.clone()) {
                        links.push(absolute);
                    }
                }
            }
            Ok(Event::CData(data)) if in_loc => {
                let value = String::from_utf8_lossy(&data.into_inner()).into_owned();
                if let Some(absolute) = accept_link(&value, base_url) {
                    if seen.insert(absolute.clone()) {
                        links.push(absolute);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            }
            _ => {}
        }
    }

    Ok(links)
}

/// Resolves a raw value and keeps it only if it is an HTTP(S) URL
///
/// Drops `javascript:`, `mailto:`, `tel:` and `data:` values, which can
/// never be checked over HTTP.
fn accept_link(raw: &str, base_url: &Url) -> Option<String> {
    let absolute = resolve_link(raw, base_url)?;
    if absolute.starts_with("http://") || absolute.starts_with("https://") {
        Some(absolute)
    } else {
        None
    }
}
