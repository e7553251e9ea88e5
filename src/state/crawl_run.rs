//! Crawl run definitions: the settings and cancellation signal of one crawl
//!
//! A `CrawlRun` is created per invocation and shared by every discovery
//! path of that crawl.

use crate::config::CrawlerConfig;
use crate::ExtractError;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A single crawl invocation
///
/// Created when a crawl starts and dropped once the records are returned.
/// Clones share the same cancellation signal.
#[derive(Debug, Clone)]
pub struct CrawlRun {
    /// The page the crawl starts from
    pub start_url: Url,

    /// Whether successfully validated links are expanded
    pub follow_internal: bool,

    /// Deepest page depth that is still expanded (start page is depth 0)
    pub max_depth: u32,

    /// Only expand links on the start page's host
    pub same_host_only: bool,

    cancel: CancellationToken,
}

impl CrawlRun {
    /// Creates a run for the given start URL
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::InvalidUrl` when the start URL does not parse
    /// or is not HTTP(S).
    pub fn new(start_url: &str, follow_internal: bool, max_depth: u32) -> Result<Self, ExtractError> {
        let parsed = Url::parse(start_url.trim()).map_err(|e| ExtractError::InvalidUrl {
            url: start_url.to_string(),
            message: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ExtractError::InvalidUrl {
                url: start_url.to_string(),
                message: "start URL must use http or https".to_string(),
            });
        }

        Ok(Self {
            start_url: parsed,
            follow_internal,
            max_depth,
            same_host_only: false,
            cancel: CancellationToken::new(),
        })
    }

    /// Creates a run from the crawler section of the configuration
    pub fn from_config(start_url: &str, config: &CrawlerConfig) -> Result<Self, ExtractError> {
        let mut run = Self::new(start_url, config.follow_internal, config.max_depth)?;
        run.same_host_only = config.same_host_only;
        Ok(run)
    }

    /// Replaces the cancellation signal with an externally owned one
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The shared cancellation signal for this run
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Raises the cancellation signal
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns true if a successfully validated link at `depth` should be expanded
    pub fn should_expand(&self, depth: u32) -> bool {
        self.follow_internal && depth <= self.max_depth
    }
}
