//! Statistics over a crawled dataset
//!
//! This module computes completeness figures for a set of canonical records
//! and prints them as the human-readable run summary.

use crate::record::{CanonicalRecord, Category};
use std::collections::HashMap;

/// How many categories to list in the summary
const TOP_CATEGORIES: usize = 10;

/// Dataset statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStatistics {
    /// Total number of canonical records
    pub total_agents: usize,

    /// Total number of discovered categories
    pub total_categories: usize,

    pub with_title: usize,
    pub with_description: usize,
    pub with_pricing: usize,
    pub with_categories: usize,
    pub with_tags: usize,
    pub with_external_links: usize,
    pub enriched: usize,

    /// Record count per pricing value, most common first
    pub pricing_distribution: Vec<(String, usize)>,

    /// Record count per category membership, most common first
    pub top_categories: Vec<(String, usize)>,
}

impl DatasetStatistics {
    /// Computes statistics from categories and records
    pub fn from_dataset(categories: &[Category], records: &[CanonicalRecord]) -> Self {
        let mut stats = Self {
            total_agents: records.len(),
            total_categories: categories.len(),
            ..Default::default()
        };

        let mut pricing: HashMap<&str, usize> = HashMap::new();
        let mut memberships: HashMap<&str, usize> = HashMap::new();

        for record in records {
            stats.with_title += usize::from(!record.title.is_empty());
            stats.with_description += usize::from(record.description.is_some());
            stats.with_pricing += usize::from(record.pricing.is_some());
            stats.with_categories += usize::from(!record.categories.is_empty());
            stats.with_tags += usize::from(!record.tags.is_empty());
            stats.with_external_links += usize::from(!record.external_links.is_empty());
            stats.enriched += usize::from(record.enriched);

            if let Some(value) = &record.pricing {
                *pricing.entry(value.as_str()).or_default() += 1;
            }
            for category in &record.categories {
                *memberships.entry(category.as_str()).or_default() += 1;
            }
        }

        stats.pricing_distribution = ranked(pricing, usize::MAX);
        stats.top_categories = ranked(memberships, TOP_CATEGORIES);
        stats
    }

    /// Share of records with a property, as a percentage
    pub fn percent(&self, count: usize) -> f64 {
        if self.total_agents > 0 {
            (count as f64 / self.total_agents as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Sorts counts descending, ties broken by name
fn ranked(counts: HashMap<&str, usize>, limit: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<_> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Total agents: {}", stats.total_agents);
    println!("  Total categories: {}", stats.total_categories);
    println!();

    println!("Completeness:");
    for (label, count) in [
        ("Title", stats.with_title),
        ("Description", stats.with_description),
        ("Pricing", stats.with_pricing),
        ("Categories", stats.with_categories),
        ("Tags", stats.with_tags),
        ("External links", stats.with_external_links),
        ("Enriched", stats.enriched),
    ] {
        println!("  {}: {} ({:.1}%)", label, count, stats.percent(count));
    }
    println!();

    if !stats.pricing_distribution.is_empty() {
        println!("Pricing:");
        for (pricing, count) in &stats.pricing_distribution {
            println!("  {}: {}", pricing, count);
        }
        println!();
    }

    if !stats.top_categories.is_empty() {
        println!("Top Categories ({}):", stats.top_categories.len());
        for (category, count) in &stats.top_categories {
            println!("  - {}: {}", category, count);
        }
        println!();
    }
}
