//! Document extraction
//!
//! This module turns parsed pages into typed records:
//! - Category anchors on the category index
//! - Item sightings on listing pages
//! - Detail fields on item pages
//! - The "next page" affordance used by pagination
//!
//! Extraction is best-effort. A field that cannot be read is left empty and
//! the failure is logged at debug level; nothing here returns an error.

use crate::config::SiteConfig;
use crate::record::{Category, DetailFields, DiscoverySource, PartialRecord};
use crate::url::{identifier_after, is_external, last_segment, normalize_url, page_number};
use crate::{ConfigError, ExtractionError};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use url::Url;

/// Minimum length of a listing description candidate
const MIN_DESCRIPTION_LEN: usize = 20;
/// Minimum length of a detail-page long description
const MIN_LONG_DESCRIPTION_LEN: usize = 50;
/// Pricing mentions longer than this are page copy, not a price
const MAX_PRICING_TEXT_LEN: usize = 200;

const DESCRIPTION_KEYWORDS: [&str; 6] = ["ai", "tool", "help", "automat", "generat", "creat"];
const LISTING_PRICING_CUES: [&str; 4] = ["free", "paid", "pricing", "$"];
const DETAIL_PRICING_CUES: [&str; 5] = ["free", "paid", "pricing", "$", "cost"];

static TOOL_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*tools?").expect("valid tool count pattern"));

static PRICING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(free \+ paid|free|paid|\$[\d,]+(\.\d+)?)").expect("valid pricing pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Swappable strategy for reading records out of documents
///
/// Implementations only read the document; they never fetch. The pipeline
/// parses each page once and hands the same `Html` to whichever methods it
/// needs.
pub trait Extractor: Send + Sync {
    /// Category roots linked from the category index, deduplicated by name
    fn extract_categories(&self, document: &Html, page_url: &Url) -> Vec<Category>;

    /// One partial record per item link on a listing page
    fn extract_listing_items(
        &self,
        document: &Html,
        page_url: &Url,
        source: &DiscoverySource,
    ) -> Vec<PartialRecord>;

    /// Fields from an item's detail page
    fn extract_detail(&self, document: &Html, page_url: &Url) -> DetailFields;

    /// True if the page links to listing page `next_page` of the same root
    fn has_next_page(&self, document: &Html, page_url: &Url, next_page: u32) -> bool;
}

/// Keyword and path-convention heuristics for directory sites
#[derive(Debug, Clone)]
pub struct HeuristicExtractor {
    origin: Url,
    category_index_path: String,
    item_segment: String,
    category_segment: String,
    tag_segment: String,
}

impl HeuristicExtractor {
    pub fn new(site: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            origin: site.root()?,
            category_index_path: site.category_index_path.trim_end_matches('/').to_string(),
            item_segment: site.item_path_segment.clone(),
            category_segment: site.category_path_segment.clone(),
            tag_segment: site.tag_path_segment.clone(),
        })
    }

    /// Resolves an href to an item detail URL on the origin host
    ///
    /// Returns the normalized URL and the item identifier.
    fn item_link(&self, href: &str, page_url: &Url) -> Option<(Url, String)> {
        let url = match normalize_url(href, page_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::trace!("Skipping link: {}", e);
                return None;
            }
        };

        if is_external(&url, &self.origin) || !url.path().contains(&self.item_segment) {
            return None;
        }

        let name = last_segment(&url)?;
        Some((url, name))
    }

    /// Picks the listing context for an item anchor
    ///
    /// The anchor's parent is used when it holds no link to a different item;
    /// otherwise the anchor itself.
    fn listing_context<'a>(&self, anchor: ElementRef<'a>, item_url: &Url, page_url: &Url) -> ElementRef<'a> {
        let Some(parent) = anchor.parent().and_then(ElementRef::wrap) else {
            return anchor;
        };

        let shared = anchors(parent).any(|other| {
            other
                .value()
                .attr("href")
                .and_then(|href| self.item_link(href, page_url))
                .is_some_and(|(url, _)| &url != item_url)
        });

        if shared {
            anchor
        } else {
            parent
        }
    }

    fn memberships(&self, document: &Html, page_url: &Url, segment: &str) -> Vec<String> {
        let mut found = Vec::new();

        for anchor in document_anchors(document) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(url) = normalize_url(href, page_url) else {
                continue;
            };
            if is_external(&url, &self.origin) {
                continue;
            }
            if let Some(identifier) = identifier_after(url.path(), segment) {
                if !found.contains(&identifier) {
                    found.push(identifier);
                }
            }
        }

        found
    }
}

impl Extractor for HeuristicExtractor {
    fn extract_categories(&self, document: &Html, page_url: &Url) -> Vec<Category> {
        let mut seen = HashSet::new();
        let mut categories = Vec::new();

        for anchor in document_anchors(document) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let url = match normalize_url(href, page_url) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Ignoring category link: {}", e);
                    continue;
                }
            };

            if is_external(&url, &self.origin) || url.path() == self.category_index_path {
                continue;
            }
            let Some(name) = identifier_after(url.path(), &self.category_segment) else {
                continue;
            };
            if !seen.insert(name.clone()) {
                continue;
            }

            let text = collapse(&anchor.text().collect::<String>());
            let count = TOOL_COUNT
                .captures(&text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse().ok());
            let title = collapse(&TOOL_COUNT.replace_all(&text, ""));
            let title = if title.is_empty() { name.clone() } else { title };

            categories.push(Category {
                name,
                title,
                url: url.to_string(),
                count,
            });
        }

        categories
    }

    fn extract_listing_items(
        &self,
        document: &Html,
        page_url: &Url,
        source: &DiscoverySource,
    ) -> Vec<PartialRecord> {
        let mut items = Vec::new();

        for anchor in document_anchors(document) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some((url, name)) = self.item_link(href, page_url) else {
                continue;
            };

            let mut partial = PartialRecord::new(url.to_string(), name.clone(), source.clone());

            partial.title = heading_text(anchor).or_else(|| {
                let text = collapse(&anchor.text().collect::<String>());
                (!text.is_empty()).then_some(text)
            });

            let context = self.listing_context(anchor, &url, page_url);
            partial.short_description = description_candidate(context, partial.title.as_deref(), &name);
            partial.pricing_hint = pricing_candidate(context);

            items.push(partial);
        }

        items
    }

    fn extract_detail(&self, document: &Html, page_url: &Url) -> DetailFields {
        let mut detail = DetailFields {
            heading: first_text(document, "h1"),
            meta_description: meta_content(document, "meta[name='description']"),
            long_description: long_description(document),
            pricing_info: pricing_mention(document),
            ..Default::default()
        };

        if detail.heading.is_none() {
            tracing::debug!("{}", ExtractionError::MissingElement("h1"));
        }

        for anchor in document_anchors(document) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            match normalize_url(href, page_url) {
                Ok(url) if is_external(&url, &self.origin) => {
                    let link = url.to_string();
                    if !detail.external_links.contains(&link) {
                        detail.external_links.push(link);
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::trace!("Skipping link: {}", e),
            }
        }

        detail.categories = self.memberships(document, page_url, &self.category_segment);
        detail.tags = self.memberships(document, page_url, &self.tag_segment);
        detail.social_meta = social_meta(document);

        detail
    }

    fn has_next_page(&self, document: &Html, page_url: &Url, next_page: u32) -> bool {
        let Ok(selector) = Selector::parse("a[href], link[rel='next'][href]") else {
            return false;
        };

        // Both sides normalized so `/categories/writing/?page=2` matches `/categories/writing`
        let Ok(current) = normalize_url(page_url.as_str(), page_url) else {
            return false;
        };

        document.select(&selector).any(|element| {
            element
                .value()
                .attr("href")
                .and_then(|href| normalize_url(href, page_url).ok())
                .is_some_and(|url| url.path() == current.path() && page_number(&url) == Some(next_page))
        })
    }
}

fn document_anchors(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    let selector = Selector::parse("a[href]").ok();
    let elements: Vec<_> = match &selector {
        Some(selector) => document.select(selector).collect(),
        None => Vec::new(),
    };
    elements.into_iter()
}

fn anchors(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    let selector = Selector::parse("a[href]").ok();
    let elements: Vec<_> = match &selector {
        Some(selector) => element.select(selector).collect(),
        None => Vec::new(),
    };
    elements.into_iter()
}

/// Collapses runs of whitespace and trims
fn collapse(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Text of the first heading nested inside an anchor
fn heading_text(anchor: ElementRef<'_>) -> Option<String> {
    let selector = Selector::parse("h1, h2, h3, h4").ok()?;
    anchor
        .select(&selector)
        .map(|heading| collapse(&heading.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

/// Trimmed text nodes below an element, skipping script and style content
fn text_nodes(element: ElementRef<'_>) -> Vec<String> {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            if matches!(parent.value().name(), "script" | "style" | "noscript") {
                return None;
            }
            let text = collapse(text);
            (!text.is_empty()).then_some(text)
        })
        .collect()
}

fn description_candidate(context: ElementRef<'_>, title: Option<&str>, name: &str) -> Option<String> {
    text_nodes(context)
        .into_iter()
        .filter(|text| text.chars().count() > MIN_DESCRIPTION_LEN)
        .filter(|text| Some(text.as_str()) != title && text != name)
        .filter(|text| {
            let lower = text.to_lowercase();
            DESCRIPTION_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .fold(None, |best: Option<String>, text| match best {
            Some(best) if best.chars().count() >= text.chars().count() => Some(best),
            _ => Some(text),
        })
}

fn pricing_candidate(context: ElementRef<'_>) -> Option<String> {
    let text = collapse(&context.text().collect::<Vec<_>>().join(" "));
    let lower = text.to_lowercase();
    if !LISTING_PRICING_CUES.iter().any(|cue| lower.contains(cue)) {
        return None;
    }
    PRICING.find(&text).map(|m| normalize_pricing(m.as_str()))
}

/// Canonical spelling of a matched pricing token: `Free`, `Paid`,
/// `Free + Paid` or the dollar amount as written
fn normalize_pricing(token: &str) -> String {
    match token.to_lowercase().as_str() {
        "free" => "Free".to_string(),
        "paid" => "Paid".to_string(),
        "free + paid" => "Free + Paid".to_string(),
        _ => token.to_string(),
    }
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .map(|element| collapse(&element.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(collapse)
        .find(|content| !content.is_empty())
}

fn long_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("[class]").ok()?;
    document
        .select(&selector)
        .filter(|element| {
            element.value().attr("class").is_some_and(|class| {
                let class = class.to_lowercase();
                class.contains("description") || class.contains("content")
            })
        })
        .map(|element| collapse(&element.text().collect::<Vec<_>>().join(" ")))
        .find(|text| text.chars().count() > MIN_LONG_DESCRIPTION_LEN)
}

fn pricing_mention(document: &Html) -> Option<String> {
    let selector = Selector::parse("body").ok()?;
    let body = document.select(&selector).next()?;
    text_nodes(body).into_iter().find(|text| {
        let lower = text.to_lowercase();
        text.chars().count() <= MAX_PRICING_TEXT_LEN
            && DETAIL_PRICING_CUES.iter().any(|cue| lower.contains(cue))
    })
}

/// Open-graph and twitter card properties as `meta_og_*` / `meta_twitter_*`
fn social_meta(document: &Html) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();
    let Ok(selector) = Selector::parse("meta[content]") else {
        return meta;
    };

    for element in document.select(&selector) {
        let key = element
            .value()
            .attr("property")
            .or_else(|| element.value().attr("name"))
            .map(str::trim)
            .unwrap_or_default();
        if !(key.starts_with("og:") || key.starts_with("twitter:")) {
            continue;
        }
        let Some(content) = element.value().attr("content").map(collapse) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }

        let key = format!("meta_{}", key.replace(':', "_"));
        meta.entry(key).or_insert(content);
    }

    meta
}
