use serde::Deserialize;

/// Browser User-Agent sent with every request; some hosts reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Web Status Checker
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Whether successfully validated links are expanded recursively
    #[serde(rename = "follow-internal")]
    pub follow_internal: bool,

    /// Only expand links on the start page's host
    #[serde(rename = "same-host-only")]
    pub same_host_only: bool,

    /// Maximum depth of expanded pages (the start page is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Ceiling on concurrent link validations
    #[serde(rename = "max-concurrent-checks")]
    pub max_concurrent_checks: u32,

    /// Per-request timeout for link validation (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Timeout for fetching a document to extract links from (seconds)
    #[serde(rename = "extract-timeout-secs")]
    pub extract_timeout_secs: u64,

    /// Number of attempts made to fetch a document
    #[serde(rename = "extract-attempts")]
    pub extract_attempts: u32,

    /// Additional validation attempts after a transport error
    pub retries: u32,

    /// Fixed delay between validation attempts (milliseconds)
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,

    /// Maximum number of redirect hops followed per request
    #[serde(rename = "max-redirects")]
    pub max_redirects: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            follow_internal: false,
            same_host_only: false,
            max_depth: 1,
            max_concurrent_checks: 20,
            request_timeout_secs: 10,
            extract_timeout_secs: 20,
            extract_attempts: 3,
            retries: 2,
            retry_backoff_ms: 1000,
            max_redirects: 10,
        }
    }
}

/// User agent configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the reports are written to
    #[serde(rename = "report-dir")]
    pub report_dir: String,

    /// Report formats to produce ("html", "json", "csv")
    pub formats: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: "test-results".to_string(),
            formats: vec!["html".to_string(), "json".to_string(), "csv".to_string()],
        }
    }
}
