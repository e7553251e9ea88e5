//! Frontier: the set of URLs already scheduled in a crawl run
//!
//! The set only grows. Filtering and registration happen under one lock, so
//! two discovery paths offering the same URL concurrently cannot both see it
//! as new.

use crate::url::is_navigable;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Deduplicating set of scheduled URLs, shared by every discovery path
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    seen: Arc<Mutex<HashSet<String>>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters candidates down to unseen, navigable URLs and registers them
    ///
    /// Empty and `javascript:` URLs are dropped. Duplicates within
    /// `candidates` are accepted once. The accepted URLs are in the seen-set
    /// before this returns.
    pub fn filter_new<I, S>(&self, candidates: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());

        candidates
            .into_iter()
            .filter_map(|candidate| {
                let candidate = candidate.as_ref();
                if !is_navigable(candidate) {
                    tracing::debug!("Skipping non-navigable link: {:?}", candidate);
                    return None;
                }
                if seen.insert(candidate.to_string()) {
                    Some(candidate.to_string())
                } else {
                    None
                }
            })
            .collect()
    }

    /// Registers a single URL; returns true if it was not seen before
    pub fn insert(&self, url: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        let seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.contains(url)
    }

    pub fn len(&self) -> usize {
        let seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
