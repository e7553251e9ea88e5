//! Scheduler for concurrent link validation
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - Spawning one validation task per link
//! - A wall-clock deadline per validation
//! - Returning outcomes in the order the links were discovered

use crate::crawler::fetcher::Fetcher;
use crate::crawler::validator::{validate, CANCELLED_TAG};
use crate::state::ValidationOutcome;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs validations with bounded concurrency
///
/// The semaphore is shared by every batch checked through this scheduler,
/// so the limit holds across discovery paths.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Global semaphore for limiting in-flight validations
    semaphore: Arc<Semaphore>,

    fetcher: Arc<Fetcher>,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared HTTP access
    /// * `max_concurrent` - Maximum number of validations in flight (at least 1)
    pub fn new(fetcher: Arc<Fetcher>, max_concurrent: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            fetcher,
        }
    }

    /// Number of validations that may start right now
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Validates every URL and returns one outcome per URL, in input order
    ///
    /// Validations still waiting for a permit when `cancel` fires resolve to
    /// an `Error` outcome noted `Cancelled`. A validation that runs past the
    /// deadline resolves to `ReadTimeout`.
    pub async fn check_all(
        &self,
        urls: Vec<String>,
        cancel: &CancellationToken,
    ) -> Vec<ValidationOutcome> {
        let deadline = self.fetcher.settings().validation_deadline();
        let mut tasks = JoinSet::new();

        for (index, url) in urls.iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let cancel = cancel.clone();
            let url = url.clone();

            tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        return (index, ValidationOutcome::failed(url, CANCELLED_TAG));
                    }
                    permit = semaphore.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (index, ValidationOutcome::failed(url, CANCELLED_TAG)),
                    },
                };

                let result =
                    tokio::time::timeout(deadline, validate(&fetcher, &url, &cancel)).await;
                let outcome = match result {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::warn!("Validation of {} exceeded {:?}", url, deadline);
                        ValidationOutcome::failed(url, "ReadTimeout")
                    }
                };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<ValidationOutcome>> = vec![None; urls.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!("Validation task failed: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(urls)
            .map(|(slot, url)| {
                slot.unwrap_or_else(|| {
                    ValidationOutcome::failed(url, "UnhandledError:validation task panicked")
                })
            })
            .collect()
    }
}
