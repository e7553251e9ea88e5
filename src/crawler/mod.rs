//! Crawler module: link discovery and validation
//!
//! This module contains the core checking logic, including:
//! - Status classification of results
//! - HTTP fetching with manual redirect handling and retry logic
//! - Anchor, form and sitemap link extraction
//! - The Frontier dedup set
//! - Per-link validation and bounded concurrent batch checking
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;
mod status;
mod validator;

pub use coordinator::{run_crawl, run_crawl_with_config, Coordinator, CrawlFailure};
pub use fetcher::{build_http_client, is_markup, Document, FetchSettings, Fetcher, SendError};
pub use frontier::Frontier;
pub use parser::{extract_anchors, extract_form_actions, extract_sitemap_locs, parse_links};
pub use scheduler::Scheduler;
pub use status::{classify, UNEXPECTED_STATUS_NOTE};
pub use validator::{
    error_tag, transition, validate, ProbeMethod, ProbeResponse, ProbeResult, ProbeState, Terminal,
    Transition, CANCELLED_TAG, GATEWAY_RETRY_CODES,
};
