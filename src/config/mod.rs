//! Configuration module for Web Status Checker
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing values fall back to the defaults used
//! by the command-line tool.
//!
//! # Example
//!
//! ```no_run
//! use web_status_checker::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("checker.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, SUPPORTED_FORMATS};
