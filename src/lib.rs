//! Web Status Checker: a link health checker
//!
//! This crate fetches a start page, discovers the links it contains (anchors,
//! sitemap entries and form actions), validates every link over HTTP with
//! retries and redirect tracking, and optionally follows successfully
//! validated links up to a bounded depth.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Web Status Checker operations
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while fetching a document and pulling links out of it
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Non-HTML content ({content_type})")]
    NonHtmlContent { content_type: String },

    #[error("HTTP {status} while fetching document")]
    HttpStatus { status: u16 },

    #[error("{message}")]
    Transport { message: String },

    #[error("Failed to parse document: {0}")]
    Parse(String),

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Crawl cancelled")]
    Cancelled,
}

/// Result type alias for Web Status Checker operations
pub type Result<T> = std::result::Result<T, CheckerError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CrawlFailure};
pub use state::{CrawlRun, LinkRecord, LinkStatus, SourceType};
