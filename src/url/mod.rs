//! URL handling module for Web Status Checker
//!
//! This module provides link resolution, navigability filtering, binary-file
//! detection, host extraction, and classification of links relative to the
//! page they were found on.

mod domain;
mod links;

// Re-export main functions
pub use domain::{extract_domain, same_host};
pub use links::{is_binary_path, is_navigable, resolve_link, sitemap_url, BINARY_EXTENSIONS};

/// How a link relates to the page it was discovered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Government or education host
    Trusted,
    /// Same host as the source page
    Internal,
    /// Any other host
    External,
}

impl LinkClass {
    /// CSS class used by the HTML report
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Trusted => "trusted",
            Self::Internal => "internal",
            Self::External => "",
        }
    }
}

/// Classifies a link relative to the page it was found on
///
/// Trusted hosts take priority over the internal check, so a `.gov` page
/// linking to itself is still reported as trusted.
///
/// # Examples
///
/// ```
/// use web_status_checker::url::{classify_link, LinkClass};
///
/// assert_eq!(classify_link("https://data.gov/x", "https://example.com/"), LinkClass::Trusted);
/// assert_eq!(classify_link("https://example.com/a", "https://example.com/"), LinkClass::Internal);
/// assert_eq!(classify_link("https://other.com/", "https://example.com/"), LinkClass::External);
/// ```
pub fn classify_link(url: &str, source_url: &str) -> LinkClass {
    let domain = extract_domain(url).unwrap_or_default();

    if domain.contains(".gov") || domain.contains(".edu") {
        return LinkClass::Trusted;
    }

    if same_host(url, source_url) {
        LinkClass::Internal
    } else {
        LinkClass::External
    }
}
