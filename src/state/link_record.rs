//! Link record definitions: the terminal observation of one checked link
//!
//! A `LinkRecord` is built once, from a validation outcome plus its
//! provenance, and is only ever appended to a result list afterwards.
use serde::{Serialize, Serializer};
use std::fmt;

/// Final status of a link check
///
/// Numeric HTTP statuses and non-HTTP failures are kept apart instead of
/// mixing a string sentinel into an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    /// The server answered with this HTTP status code
    Http(u16),

    /// No HTTP response could be obtained (timeout, connection error, ...)
    Error,
}

impl LinkStatus {
    /// Returns the numeric status code, if any
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Http(code) => Some(*code),
            Self::Error => None,
        }
    }

    /// Returns true if the link is alive (numeric status below 400)
    ///
    /// Only successful links are expanded during recursive crawling.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Http(code) if *code < 400)
    }

    /// Returns true for a 2xx status
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Http(code) if (200..300).contains(code))
    }

    /// Returns true if the server answered with an error status (>= 400)
    pub fn is_broken(&self) -> bool {
        matches!(self, Self::Http(code) if *code >= 400)
    }

    /// Returns true if no HTTP response was obtained
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(code) => write!(f, "{}", code),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

// Serialized as the bare status number, or the string "ERROR"
impl Serialize for LinkStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Http(code) => serializer.serialize_u16(*code),
            Self::Error => serializer.serialize_str("ERROR"),
        }
    }
}

/// How a link was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// `<a href>` on a fetched page
    Anchor,
    /// `<loc>` entry of the site's sitemap.xml
    Sitemap,
    /// `<form action>` on the start page
    Form,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anchor => "anchor",
            Self::Sitemap => "sitemap",
            Self::Form => "form",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of validating one URL, before provenance is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// The link as discovered (pre-redirect)
    pub url: String,

    /// Final HTTP status, or `Error` for a transport failure
    pub status: LinkStatus,

    /// Human readable description of the outcome
    pub note: String,

    /// URL after following redirects (equals `url` if none)
    pub final_url: String,

    /// Number of redirect hops followed
    pub redirect_count: usize,

    /// URLs visited in order, ending at `final_url`; empty on failure
    pub redirect_chain: Vec<String>,
}

impl ValidationOutcome {
    /// Builds the outcome for a link that never produced an HTTP response
    pub fn failed(url: impl Into<String>, note: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status: LinkStatus::Error,
            note: note.into(),
            redirect_count: 0,
            redirect_chain: Vec::new(),
        }
    }
}

/// One validated link observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub url: String,
    #[serde(rename = "status_code")]
    pub status: LinkStatus,
    pub note: String,
    pub source_type: SourceType,
    pub source_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub redirect_chain: Vec<String>,
}

impl LinkRecord {
    /// Attaches provenance to a validation outcome
    pub fn new(outcome: ValidationOutcome, source_type: SourceType, source_url: &str) -> Self {
        Self {
            url: outcome.url,
            status: outcome.status,
            note: outcome.note,
            source_type,
            source_url: source_url.to_string(),
            final_url: outcome.final_url,
            redirect_count: outcome.redirect_count,
            redirect_chain: outcome.redirect_chain,
        }
    }

    /// Returns true if at least one redirect was followed
    pub fn was_redirected(&self) -> bool {
        self.redirect_count > 0
    }
}
