use std::fmt;

/// One entry point into the paginated listings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TraversalRoot {
    /// The site's main listing
    Main,
    /// One category's listing, by category name
    Category(String),
}

impl fmt::Display for TraversalRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Category(name) => write!(f, "category:{}", name),
        }
    }
}

/// Where a partial record was seen: traversal root plus listing page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoverySource {
    pub root: TraversalRoot,
    pub page: u32,
}

impl DiscoverySource {
    pub fn new(root: TraversalRoot, page: u32) -> Self {
        Self { root, page }
    }
}

impl fmt::Display for DiscoverySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:page:{}", self.root, self.page)
    }
}

/// A single sighting of an item link on a listing page
///
/// The same item usually yields many of these; the aggregator folds them
/// into one canonical record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    /// Normalized detail-page URL; the identity key
    pub item_url: String,

    /// Identifier from the URL's trailing path segment
    pub name: String,

    pub source: DiscoverySource,
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub pricing_hint: Option<String>,
    pub category_hints: Vec<String>,
}

impl PartialRecord {
    /// Creates a sighting with no optional fields populated
    ///
    /// Category roots contribute their own name as a category hint.
    pub fn new(item_url: impl Into<String>, name: impl Into<String>, source: DiscoverySource) -> Self {
        let category_hints = match &source.root {
            TraversalRoot::Category(category) => vec![category.clone()],
            TraversalRoot::Main => Vec::new(),
        };

        Self {
            item_url: item_url.into(),
            name: name.into(),
            source,
            title: None,
            short_description: None,
            pricing_hint: None,
            category_hints,
        }
    }
}
