use crate::record::{DetailFields, PartialRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The single merged record for one item URL
///
/// Merge rules:
/// - scalar fields (`title`, `description`, `pricing`) are first-writer-wins:
///   they are only filled while unset
/// - `categories`, `tags` and `external_links` are ordered sets, unioned
/// - detail metadata keys are first-writer-wins per key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Identifier from the URL's trailing path segment
    pub name: String,

    /// Detail-page URL; the identity key
    pub url: String,

    /// First discovery source, e.g. `main:page:1`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,

    /// Display title; empty until some source provides one
    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub external_links: Vec<String>,

    /// True once a detail-page pass succeeded
    #[serde(default)]
    pub enriched: bool,

    /// Namespaced detail-page values, serialized inline with the record
    #[serde(flatten)]
    pub detail_metadata: BTreeMap<String, String>,
}

impl CanonicalRecord {
    /// Seeds a record from the first sighting of its URL
    pub fn from_partial(partial: PartialRecord) -> Self {
        let mut record = Self {
            name: partial.name.clone(),
            url: partial.item_url.clone(),
            source: partial.source.to_string(),
            title: String::new(),
            description: None,
            pricing: None,
            categories: Vec::new(),
            tags: Vec::new(),
            external_links: Vec::new(),
            enriched: false,
            detail_metadata: BTreeMap::new(),
        };
        record.absorb(partial);
        record
    }

    /// Merges a later sighting of the same item into this record
    pub fn absorb(&mut self, partial: PartialRecord) {
        debug_assert_eq!(self.url, partial.item_url);

        fill_title(&mut self.title, partial.title);
        fill(&mut self.description, partial.short_description);
        fill(&mut self.pricing, partial.pricing_hint);
        union(&mut self.categories, partial.category_hints);
    }

    /// Merges the fields read from this item's detail page
    pub fn apply_detail(&mut self, detail: DetailFields) {
        for (key, value) in detail.metadata() {
            self.detail_metadata.entry(key).or_insert(value);
        }

        fill_title(&mut self.title, detail.heading);
        fill(&mut self.description, detail.meta_description);
        fill(&mut self.description, detail.long_description);
        fill(&mut self.pricing, detail.pricing_info);
        union(&mut self.categories, detail.categories);
        union(&mut self.tags, detail.tags);
        union(&mut self.external_links, detail.external_links);
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value.filter(|v| !v.trim().is_empty());
    }
}

fn fill_title(slot: &mut String, value: Option<String>) {
    if slot.is_empty() {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            *slot = value;
        }
    }
}

/// Appends items not already present, keeping first-seen order
fn union(set: &mut Vec<String>, items: Vec<String>) {
    for item in items {
        if !item.is_empty() && !set.contains(&item) {
            set.push(item);
        }
    }
}
