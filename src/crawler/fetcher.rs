//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the checker, including:
//! - Building HTTP clients with the browser user agent
//! - Manual redirect handling with full chain capture
//! - Fetching documents for link extraction, with retries on transport errors
//! - Content-Type gating before a document is parsed

use crate::config::Config;
use crate::crawler::parser::parse_links;
use crate::state::SourceType;
use crate::ExtractError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, LOCATION, REFERER};
use reqwest::{redirect::Policy, Client, Method, Response, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Errors from a single request, including its redirect hops
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Too many redirects from {url} (limit {limit})")]
    TooManyRedirects { url: String, limit: usize },

    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

/// A response together with the URLs visited to reach it
#[derive(Debug)]
pub struct RedirectedResponse {
    /// The final (non-redirect) response
    pub response: Response,

    /// Requested URL first, final URL last
    pub chain: Vec<String>,
}

impl RedirectedResponse {
    /// URL of the final response
    pub fn final_url(&self) -> &str {
        self.chain.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of redirect hops followed
    pub fn redirect_count(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }
}

/// A fetched document ready for parsing
#[derive(Debug, Clone)]
pub struct Document {
    /// URL the document was served from (after redirects)
    pub url: Url,
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Timing and retry settings shared by extraction and validation
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub request_timeout: Duration,
    pub extract_timeout: Duration,
    pub extract_attempts: u32,
    pub retries: u32,
    pub retry_backoff: Duration,
    pub max_redirects: usize,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        let crawler = &config.crawler;
        Self {
            request_timeout: Duration::from_secs(crawler.request_timeout_secs),
            extract_timeout: Duration::from_secs(crawler.extract_timeout_secs),
            extract_attempts: crawler.extract_attempts.max(1),
            retries: crawler.retries,
            retry_backoff: Duration::from_millis(crawler.retry_backoff_ms),
            max_redirects: crawler.max_redirects as usize,
        }
    }

    /// Wall-clock cap for one full link validation
    ///
    /// Covers the HEAD probe, the GET fallback and the gateway retry of every
    /// attempt, plus the backoff between attempts.
    pub fn validation_deadline(&self) -> Duration {
        let attempts = self.retries + 1;
        (self.request_timeout * 3 + self.retry_backoff) * attempts + Duration::from_secs(1)
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are never followed by the client itself; [`Fetcher::send`]
/// follows them so every hop can be recorded.
///
/// # Arguments
///
/// * `config` - The checker configuration
/// * `http1_only` - Disable HTTP/2 negotiation
pub fn build_http_client(config: &Config, http1_only: bool) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
    let connect_timeout = timeout.min(Duration::from_secs(10));

    let mut builder = Client::builder()
        .user_agent(config.user_agent.value.clone())
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true);

    if http1_only {
        // Gateway retries must not reuse a kept-alive connection
        builder = builder.http1_only().pool_max_idle_per_host(0);
    }

    builder.build()
}

/// Shared HTTP access for a crawl run
///
/// Holds the main client and an HTTP/1.1-only client that opens a fresh
/// connection for every request. Cloning is cheap; clones share the clients.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    http1_client: Client,
    settings: FetchSettings,
}

impl Fetcher {
    /// Creates a fetcher from the checker configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, false)?,
            http1_client: build_http_client(config, true)?,
            settings: FetchSettings::from_config(config),
        })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Sends a request and follows redirects manually
    ///
    /// # Redirect Handling
    ///
    /// - Every hop is appended to the chain; the first entry is `url` as given
    /// - A `303 See Other` switches to GET (HEAD stays HEAD)
    /// - A hop back to an already visited URL is a redirect loop
    /// - More than `max_redirects` hops is an error
    /// - A redirect status without a `Location` header is returned as-is
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method of the first request
    /// * `url` - The URL to request
    /// * `headers` - Extra headers sent with every hop
    /// * `timeout` - Per-hop timeout overriding the client default
    /// * `http1_only` - Use the HTTP/1.1-only client
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        timeout: Option<Duration>,
        http1_only: bool,
    ) -> Result<RedirectedResponse, SendError> {
        let client = if http1_only {
            &self.http1_client
        } else {
            &self.client
        };

        let mut current = Url::parse(url.trim()).map_err(|e| SendError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let mut method = method;
        let mut chain = vec![url.to_string()];
        let mut visited = HashSet::from([current.to_string()]);

        loop {
            let mut request = client
                .request(method.clone(), current.clone())
                .headers(headers.clone());
            if let Some(timeout) = timeout {
                request = request.timeout(timeout);
            }

            let response = request.send().await?;
            let status = response.status();

            if !status.is_redirection() || status == StatusCode::NOT_MODIFIED {
                return Ok(RedirectedResponse { response, chain });
            }

            let Some(location) = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
            else {
                return Ok(RedirectedResponse { response, chain });
            };

            let next = current.join(location).map_err(|e| SendError::InvalidUrl {
                url: location.to_string(),
                message: e.to_string(),
            })?;

            if chain.len() > self.settings.max_redirects {
                return Err(SendError::TooManyRedirects {
                    url: url.to_string(),
                    limit: self.settings.max_redirects,
                });
            }

            if !visited.insert(next.to_string()) {
                return Err(SendError::RedirectLoop {
                    url: next.to_string(),
                });
            }

            if status == StatusCode::SEE_OTHER && method != Method::HEAD {
                method = Method::GET;
            }

            tracing::trace!("{} {} -> {}", status.as_u16(), current, next);
            chain.push(next.to_string());
            current = next;
        }
    }

    /// Fetches a document for link extraction
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Transport error (connect, timeout, body read) | Retry, up to `extract_attempts` total |
    /// | Non-HTML/XML Content-Type (anchors, forms) | Immediate `NonHtmlContent`, body not read |
    /// | Non-200 status (sitemaps) | Immediate `HttpStatus` |
    /// | HTTP error status (anchors, forms) | Parsed like any other page |
    ///
    /// When every attempt fails the message of the last one is returned.
    pub async fn fetch_document(
        &self,
        url: &str,
        kind: SourceType,
        cancel: &CancellationToken,
    ) -> Result<Document, ExtractError> {
        let attempts = self.settings.extract_attempts;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExtractError::Cancelled),
                result = self.fetch_document_once(url, kind) => result,
            };

            match result {
                Ok(document) => return Ok(document),
                Err(ExtractError::Transport { message }) => {
                    tracing::warn!(
                        "Request failed for {} (attempt {}/{}): {}",
                        url,
                        attempt,
                        attempts,
                        message
                    );
                    last_error = message;
                }
                Err(e) => return Err(e),
            }
        }

        Err(ExtractError::Transport {
            message: last_error,
        })
    }

    async fn fetch_document_once(&self, url: &str, kind: SourceType) -> Result<Document, ExtractError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        if let Ok(referer) = HeaderValue::from_str(url) {
            headers.insert(REFERER, referer);
        }

        let sent = self
            .send(
                Method::GET,
                url,
                headers,
                Some(self.settings.extract_timeout),
                false,
            )
            .await
            .map_err(|e| match e {
                SendError::InvalidUrl { url, message } => ExtractError::InvalidUrl { url, message },
                other => ExtractError::Transport {
                    message: describe_send_error(&other),
                },
            })?;

        let response = sent.response;
        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        match kind {
            SourceType::Sitemap => {
                if status != 200 {
                    return Err(ExtractError::HttpStatus { status });
                }
            }
            SourceType::Anchor | SourceType::Form => {
                if !is_markup(&content_type) {
                    tracing::warn!(
                        "Non-HTML content received from {}. Skipping link extraction.",
                        url
                    );
                    return Err(ExtractError::NonHtmlContent {
                        content_type: if content_type.is_empty() {
                            "unknown".to_string()
                        } else {
                            content_type
                        },
                    });
                }
            }
        }

        let body = response.text().await.map_err(|e| ExtractError::Transport {
            message: format!("Failed to read body: {}", describe_send_error(&SendError::Http(e))),
        })?;

        Ok(Document {
            url: final_url,
            status,
            content_type,
            body,
        })
    }

    /// Fetches a document and extracts the links of one discovery kind
    ///
    /// Returns an empty list (not an error) when the document has no
    /// matching elements.
    pub async fn extract_links(
        &self,
        url: &str,
        kind: SourceType,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ExtractError> {
        let document = self.fetch_document(url, kind, cancel).await?;
        let links = parse_links(kind, &document.body, &document.url).map_err(ExtractError::Parse)?;
        tracing::info!("Extracted {} {} links from {}", links.len(), kind, url);
        Ok(links)
    }
}

/// Returns true if the Content-Type denotes HTML or XML
pub fn is_markup(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.contains("html") || content_type.contains("xml")
}

/// Human readable description of a send error, without the URL
fn describe_send_error(error: &SendError) -> String {
    match error {
        SendError::Http(e) if e.is_timeout() => "Request timed out".to_string(),
        SendError::Http(e) if e.is_connect() => format!("Connection failed: {}", root_cause(e)),
        SendError::Http(e) => root_cause(e),
        other => other.to_string(),
    }
}

fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
