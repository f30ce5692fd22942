use crate::ExtractionError;
use url::Url;

/// Query parameters that never change which item a link points at
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
    "ref",
];

/// Resolves an href against `base` and normalizes it into an identity key
///
/// # Normalization Steps
///
/// 1. Resolve relative hrefs against the page URL
/// 2. Reject non-HTTP(S) schemes
/// 3. Remove dot segments, duplicate slashes and the trailing slash
///    (except for root `/`)
/// 4. Remove the fragment
/// 5. Remove tracking query parameters, dropping an empty query string
///
/// Scheme and host are kept as-is (apart from the host lowercasing done by
/// the parser) since the result is also the URL that gets fetched.
///
/// # Examples
///
/// ```
/// use agent_atlas::url::normalize_url;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/categories/writing").unwrap();
/// let url = normalize_url("/agent/copybot/?utm_source=x#reviews", &base).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/agent/copybot");
/// ```
pub fn normalize_url(href: &str, base: &Url) -> Result<Url, ExtractionError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(ExtractionError::InvalidLink("empty href".to_string()));
    }

    let mut url = base
        .join(href)
        .map_err(|e| ExtractionError::InvalidLink(format!("{}: {}", href, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ExtractionError::InvalidLink(format!(
            "unsupported scheme '{}' in {}",
            url.scheme(),
            href
        )));
    }

    if url.host_str().is_none() {
        return Err(ExtractionError::InvalidLink(format!("missing host in {}", href)));
    }

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);
    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
