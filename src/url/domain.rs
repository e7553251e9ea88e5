use url::Url;

/// Extracts the lowercase host from a URL string
///
/// Returns `None` when the string does not parse or has no host
/// (e.g. `mailto:` links).
///
/// # Examples
///
/// ```
/// use web_status_checker::url::extract_domain;
///
/// assert_eq!(extract_domain("https://EXAMPLE.com/path"), Some("example.com".to_string()));
/// assert_eq!(extract_domain("not a url"), None);
/// ```
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Returns true when both URLs resolve to the same host
pub fn same_host(a: &str, b: &str) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
