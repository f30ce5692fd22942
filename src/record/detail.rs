use std::collections::BTreeMap;

/// Metadata key for the detail page's primary heading
pub const DETAILED_TITLE: &str = "detailed_title";
/// Metadata key for the detail page's meta description
pub const META_DESCRIPTION: &str = "meta_description";
/// Metadata key for the longest descriptive block on the detail page
pub const LONG_DESCRIPTION: &str = "long_description";
/// Metadata key for the first pricing mention on the detail page
pub const PRICING_INFO: &str = "pricing_info";

/// Fields read from one item detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    /// Primary heading text
    pub heading: Option<String>,
    pub meta_description: Option<String>,
    pub long_description: Option<String>,
    pub pricing_info: Option<String>,
    /// Outbound links to hosts other than the crawl origin, deduplicated
    pub external_links: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Open-graph and twitter meta properties, as `meta_<namespace>_<key>`
    pub social_meta: BTreeMap<String, String>,
}

impl DetailFields {
    /// Namespaced key/value pairs stored on the canonical record
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let mut metadata = self.social_meta.clone();

        for (key, value) in [
            (DETAILED_TITLE, &self.heading),
            (META_DESCRIPTION, &self.meta_description),
            (LONG_DESCRIPTION, &self.long_description),
            (PRICING_INFO, &self.pricing_info),
        ] {
            if let Some(value) = value {
                metadata.insert(key.to_string(), value.clone());
            }
        }

        metadata
    }
}
