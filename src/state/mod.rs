//! State module for a crawl run and its results
//!
//! # Components
//!
//! - `CrawlRun`: The parameters of one invocation plus its cancellation signal
//! - `LinkRecord`: One validated link observation with provenance
//! - `LinkStatus`: Numeric HTTP status or transport failure
//! - `ValidationOutcome`: A validator result before provenance is attached

mod crawl_run;
mod link_record;

// Re-export main types
pub use crawl_run::CrawlRun;
pub use link_record::{LinkRecord, LinkStatus, SourceType, ValidationOutcome};
