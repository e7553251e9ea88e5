//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties discovery and validation
//! together:
//! - Fetching the start page and pulling out anchors and form actions
//! - Filtering every candidate batch through the shared Frontier
//! - Validating batches through the Scheduler
//! - Expanding successfully validated links breadth-first up to the depth limit
//! - Best-effort sitemap and form discovery from the start page
//!
//! Only a failure to read the start page ends the crawl with an error. Every
//! other failure is absorbed into the records or into "no links" for that
//! branch.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{extract_anchors, extract_form_actions};
use crate::crawler::scheduler::Scheduler;
use crate::state::{CrawlRun, LinkRecord, SourceType};
use crate::url::{is_binary_path, same_host, sitemap_url};
use crate::ExtractError;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;

/// The start page could not be read, so nothing was checked
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Could not read start page {start_url}: {error}")]
pub struct CrawlFailure {
    pub start_url: String,
    pub error: ExtractError,

    /// Always empty; kept so callers handle the same shape on both paths
    pub records: Vec<LinkRecord>,
}

impl CrawlFailure {
    fn new(start_url: &str, error: ExtractError) -> Self {
        Self {
            start_url: start_url.to_string(),
            error,
            records: Vec::new(),
        }
    }
}

/// A page waiting to have its own links extracted
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueuedPage {
    url: String,
    depth: u32,
}

/// Main crawl coordinator
pub struct Coordinator {
    run: CrawlRun,
    fetcher: Arc<Fetcher>,
    frontier: Frontier,
    scheduler: Scheduler,
    records: Vec<LinkRecord>,
}

impl Coordinator {
    /// Creates a coordinator for one crawl run
    ///
    /// # Arguments
    ///
    /// * `run` - The crawl run (start URL, depth settings, cancellation)
    /// * `config` - The checker configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CheckerError::Reqwest)` - The HTTP clients could not be built
    pub fn new(run: CrawlRun, config: &Config) -> crate::Result<Self> {
        let fetcher = Arc::new(Fetcher::new(config)?);
        let scheduler = Scheduler::new(
            Arc::clone(&fetcher),
            config.crawler.max_concurrent_checks as usize,
        );

        Ok(Self {
            run,
            fetcher,
            frontier: Frontier::new(),
            scheduler,
            records: Vec::new(),
        })
    }

    /// Runs the crawl and returns every record gathered
    ///
    /// Order of work:
    /// 1. Start page anchors
    /// 2. Breadth-first expansion of successful links (if following)
    /// 3. Sitemap entries
    /// 4. Start page form actions
    ///
    /// When the run is cancelled the records gathered so far are returned.
    pub async fn run(mut self) -> Result<Vec<LinkRecord>, CrawlFailure> {
        let start_url = self.run.start_url.to_string();
        let cancel = self.run.cancellation().clone();

        tracing::info!(
            "Starting crawl of {} (follow: {}, max depth: {})",
            start_url,
            self.run.follow_internal,
            self.run.max_depth
        );

        self.frontier.insert(&start_url);

        let document = match self
            .fetcher
            .fetch_document(&start_url, SourceType::Anchor, &cancel)
            .await
        {
            Ok(document) => document,
            Err(e) => {
                tracing::error!("Failed to extract links from {}: {}", start_url, e);
                return Err(CrawlFailure::new(&start_url, e));
            }
        };

        let anchors = extract_anchors(&document.body, &document.url);
        let forms = extract_form_actions(&document.body, &document.url);
        tracing::info!("Extracted {} anchor links from {}", anchors.len(), start_url);

        let mut queue = VecDeque::new();
        let checked = self
            .check_batch(anchors, SourceType::Anchor, &start_url)
            .await;
        self.enqueue_successes(&checked, 1, &mut queue);

        self.expand(queue).await;

        if !self.run.is_cancelled() {
            self.discover_sitemap(&start_url).await;
        }

        if !self.run.is_cancelled() {
            tracing::info!("Extracted {} form actions from {}", forms.len(), start_url);
            self.check_batch(forms, SourceType::Form, &start_url).await;
        }

        if self.run.is_cancelled() {
            tracing::warn!(
                "Crawl cancelled; returning {} records gathered so far",
                self.records.len()
            );
        } else {
            tracing::info!("Crawl complete: {} links checked", self.records.len());
        }

        Ok(self.records)
    }

    /// Extracts and checks the links of every queued page, level by level
    async fn expand(&mut self, mut queue: VecDeque<QueuedPage>) {
        let cancel = self.run.cancellation().clone();

        while let Some(page) = queue.pop_front() {
            if cancel.is_cancelled() {
                break;
            }

            tracing::debug!("Expanding {} at depth {}", page.url, page.depth);

            let links = match self
                .fetcher
                .extract_links(&page.url, SourceType::Anchor, &cancel)
                .await
            {
                Ok(links) => links,
                Err(ExtractError::Cancelled) => break,
                Err(e) => {
                    tracing::warn!("Failed to extract links from {}: {}", page.url, e);
                    continue;
                }
            };

            let checked = self
                .check_batch(links, SourceType::Anchor, &page.url)
                .await;
            self.enqueue_successes(&checked, page.depth + 1, &mut queue);
        }
    }

    /// Fetches `/sitemap.xml` and checks its entries; failures are logged only
    async fn discover_sitemap(&mut self, start_url: &str) {
        let cancel = self.run.cancellation().clone();

        let Some(sitemap) = sitemap_url(&self.run.start_url) else {
            tracing::info!("No sitemap location for {}", start_url);
            return;
        };

        match self
            .fetcher
            .extract_links(sitemap.as_str(), SourceType::Sitemap, &cancel)
            .await
        {
            Ok(links) => {
                self.check_batch(links, SourceType::Sitemap, start_url).await;
            }
            Err(e) => tracing::info!("No usable sitemap at {}: {}", sitemap, e),
        }
    }

    /// Filters a batch through the Frontier, validates it and records the results
    ///
    /// Returns the records added by this batch.
    async fn check_batch(
        &mut self,
        candidates: Vec<String>,
        source_type: SourceType,
        source_url: &str,
    ) -> Vec<LinkRecord> {
        let accepted = self.frontier.filter_new(candidates);
        if accepted.is_empty() || self.run.is_cancelled() {
            return Vec::new();
        }

        tracing::debug!(
            "Checking {} new {} links from {}",
            accepted.len(),
            source_type,
            source_url
        );

        let outcomes = self
            .scheduler
            .check_all(accepted, self.run.cancellation())
            .await;

        let batch: Vec<LinkRecord> = outcomes
            .into_iter()
            .map(|outcome| LinkRecord::new(outcome, source_type, source_url))
            .collect();

        for record in &batch {
            tracing::info!("Checked {} - {} - {}", record.url, record.status, record.note);
        }

        self.records.extend(batch.iter().cloned());
        batch
    }

    /// Queues successfully validated links for expansion at `depth`
    fn enqueue_successes(&self, checked: &[LinkRecord], depth: u32, queue: &mut VecDeque<QueuedPage>) {
        if !self.run.should_expand(depth) {
            return;
        }

        let start_url = self.run.start_url.as_str();
        for record in checked {
            if !record.status.is_success() || is_binary_path(&record.url) {
                continue;
            }
            if self.run.same_host_only && !same_host(&record.url, start_url) {
                tracing::debug!("Not expanding off-host link {}", record.url);
                continue;
            }
            queue.push_back(QueuedPage {
                url: record.url.clone(),
                depth,
            });
        }
    }
}

/// Runs a complete crawl with the default configuration
///
/// # Arguments
///
/// * `start_url` - The page to start from
/// * `follow_internal` - Expand successfully validated links
/// * `max_depth` - Deepest link depth that is still expanded (start page is 0)
///
/// # Returns
///
/// * `Ok(Vec<LinkRecord>)` - Every checked link, possibly some broken or errored
/// * `Err(CrawlFailure)` - The start page could not be read; nothing was checked
pub async fn run_crawl(
    start_url: &str,
    follow_internal: bool,
    max_depth: u32,
) -> Result<Vec<LinkRecord>, CrawlFailure> {
    let run = CrawlRun::new(start_url, follow_internal, max_depth)
        .map_err(|e| CrawlFailure::new(start_url, e))?;
    run_crawl_with_config(run, &Config::default()).await
}

/// Runs a complete crawl for a prepared run and configuration
pub async fn run_crawl_with_config(
    run: CrawlRun,
    config: &Config,
) -> Result<Vec<LinkRecord>, CrawlFailure> {
    let start_url = run.start_url.to_string();
    let coordinator = Coordinator::new(run, config).map_err(|e| {
        CrawlFailure::new(
            &start_url,
            ExtractError::Transport {
                message: e.to_string(),
            },
        )
    })?;
    coordinator.run().await
}
