use url::Url;

/// Extensions that identify downloadable, non-HTML resources
pub const BINARY_EXTENSIONS: &[&str] = &[
    "pdf", "zip", "docx", "xlsx", "pptx", "png", "jpg", "jpeg", "gif",
];

/// Returns true if the link can be navigated to and checked
///
/// Empty (or whitespace-only) links and `javascript:` pseudo-links are not
/// navigable.
pub fn is_navigable(link: &str) -> bool {
    let link = link.trim();
    if link.is_empty() {
        return false;
    }

    let lower = link.to_ascii_lowercase();
    !lower.starts_with("javascript:")
}

/// Resolves a raw `href`/`action`/`loc` value against the document URL
///
/// Returns `None` for empty values and values that cannot be joined onto
/// the base. The scheme is not checked here; the document parser drops
/// anything that is not HTTP(S).
pub fn resolve_link(raw: &str, base_url: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    base_url.join(raw).ok().map(|u| u.to_string())
}

/// Returns true when the URL path ends with a known binary-file extension
pub fn is_binary_path(link: &str) -> bool {
    let path = match Url::parse(link) {
        Ok(url) => url.path().to_ascii_lowercase(),
        Err(_) => link.to_ascii_lowercase(),
    };

    match path.rsplit_once('.') {
        Some((_, ext)) => BINARY_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Location of the sitemap for the site a start URL belongs to
pub fn sitemap_url(start_url: &Url) -> Option<Url> {
    start_url.join("/sitemap.xml").ok()
}
