//! URL handling module for Agent-Atlas
//!
//! This module provides link normalization plus the small path helpers the
//! extractor and pagination walker share: building `page=N` URLs, reading
//! identifiers out of path segments and telling external hosts apart from
//! the crawl origin.

mod normalize;

pub use normalize::normalize_url;

use url::Url;

/// Query parameter carrying the listing page number
pub const PAGE_PARAM: &str = "page";

/// Builds the URL of listing page `page` for a traversal root
///
/// Page 1 is the bare listing URL; later pages append `page=N` to whatever
/// query the listing URL already carries. A `page` pair already on the
/// listing URL is replaced, never repeated.
///
/// # Examples
///
/// ```
/// use agent_atlas::url::page_url;
/// use url::Url;
///
/// let root = Url::parse("https://example.com/categories/writing").unwrap();
/// assert_eq!(page_url(&root, 1).as_str(), "https://example.com/categories/writing");
/// assert_eq!(page_url(&root, 3).as_str(), "https://example.com/categories/writing?page=3");
/// ```
pub fn page_url(listing: &Url, page: u32) -> Url {
    let mut url = listing.clone();
    let kept: Vec<(String, String)> = listing
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    if page > 1 {
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &page.to_string());
    }
    url
}

/// Returns the `page=N` value of a URL, if present and numeric
pub fn page_number(url: &Url) -> Option<u32> {
    url.query_pairs()
        .find(|(key, _)| key == PAGE_PARAM)
        .and_then(|(_, value)| value.parse().ok())
}

/// Returns the last non-empty path segment of a URL
///
/// This is the item identifier for detail URLs such as `/agent/copybot`.
pub fn last_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(|s| s.to_string())
}

/// Returns the part of `path` following `segment`, up to the next `/`
///
/// `segment` is a path convention such as `/categories/`; the bare index
/// path (`/categories`) and an empty remainder yield `None`.
pub fn identifier_after(path: &str, segment: &str) -> Option<String> {
    let (_, rest) = path.split_once(segment)?;
    let identifier = rest.split('/').next().unwrap_or_default();
    if identifier.is_empty() {
        None
    } else {
        Some(identifier.to_string())
    }
}

/// Returns true if `url` lives on a different host than the crawl origin
pub fn is_external(url: &Url, origin: &Url) -> bool {
    match (url.host_str(), origin.host_str()) {
        (Some(host), Some(origin_host)) => !host.eq_ignore_ascii_case(origin_host),
        _ => false,
    }
}
