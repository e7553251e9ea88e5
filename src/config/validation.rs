use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;

/// Report formats the output module knows how to write
pub const SUPPORTED_FORMATS: &[&str] = &["html", "json", "csv"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth and retries >= 0 are always true for u32

    if config.max_concurrent_checks < 1 || config.max_concurrent_checks > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_checks must be between 1 and 256, got {}",
            config.max_concurrent_checks
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.extract_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "extract_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.extract_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "extract_attempts must be >= 1, got {}",
            config.extract_attempts
        )));
    }

    if config.max_redirects < 1 || config.max_redirects > 50 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be between 1 and 50, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    // Header values cannot carry line breaks
    if config.value.contains(['\r', '\n']) {
        return Err(ConfigError::Validation(
            "user agent cannot contain line breaks".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.report_dir.is_empty() {
        return Err(ConfigError::Validation(
            "report_dir cannot be empty".to_string(),
        ));
    }

    for format in &config.formats {
        if !SUPPORTED_FORMATS.contains(&format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unsupported report format '{}', expected one of {:?}",
                format, SUPPORTED_FORMATS
            )));
        }
    }

    Ok(())
}
