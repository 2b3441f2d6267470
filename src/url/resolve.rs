use url::Url;

/// Resolves an extracted `href` to an absolute article URL
///
/// Path-absolute hrefs (`/a/story`) keep the page's scheme and host;
/// relative hrefs (`item`) are joined to the page's parent path, so
/// `https://x.com/news/index` + `item` becomes `https://x.com/news/item`.
/// Absolute http(s) hrefs are returned as-is.
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only anchors
/// - javascript:, mailto:, tel: and data: schemes
/// - anything that does not resolve to an http(s) URL
///
/// # Examples
///
/// ```
/// use newsdesk_ingest::url::resolve_link;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/news/page").unwrap();
/// assert_eq!(
///     resolve_link("/a/story", &page).as_deref(),
///     Some("https://example.com/a/story")
/// );
/// ```
pub fn resolve_link(href: &str, page_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match page_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
