use serde::{Deserialize, Serialize};

/// A category discovered on the category index page
///
/// Immutable once discovered; `name` is unique per crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Identifier taken from the listing URL path segment
    pub name: String,

    /// Display title (anchor text)
    pub title: String,

    /// Absolute listing URL; the category's traversal root
    pub url: String,

    /// Item count advertised next to the link, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}
