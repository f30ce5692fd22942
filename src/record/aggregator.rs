use crate::record::{CanonicalRecord, PartialRecord};
use std::collections::HashMap;

/// Outcome of one merge call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Partials that created a new canonical record
    pub created: usize,
    /// Partials folded into an existing record
    pub merged: usize,
}

/// In-memory index of canonical records, one per distinct item URL
///
/// Records keep the order in which their URL was first seen. Callers feed
/// the main listing first and then each category in discovery order, which
/// makes first-writer-wins resolution reproducible for a given input.
#[derive(Debug, Default)]
pub struct Aggregator {
    index: HashMap<String, usize>,
    records: Vec<CanonicalRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds partial records into the index
    pub fn merge<I>(&mut self, partials: I) -> MergeStats
    where
        I: IntoIterator<Item = PartialRecord>,
    {
        let mut stats = MergeStats::default();

        for partial in partials {
            match self.index.get(&partial.item_url) {
                Some(&position) => {
                    self.records[position].absorb(partial);
                    stats.merged += 1;
                }
                None => {
                    self.index
                        .insert(partial.item_url.clone(), self.records.len());
                    self.records.push(CanonicalRecord::from_partial(partial));
                    stats.created += 1;
                }
            }
        }

        stats
    }

    /// Looks up the record for an item URL
    pub fn get(&self, url: &str) -> Option<&CanonicalRecord> {
        self.index.get(url).map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-seen order
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Mutable view for in-place enrichment; the index stays valid since
    /// records can be changed but not added or removed through it
    pub fn records_mut(&mut self) -> &mut [CanonicalRecord] {
        &mut self.records
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.records
    }
}

/// Merges a sequence of partial records into canonical records
pub fn merge_partials<I>(partials: I) -> Vec<CanonicalRecord>
where
    I: IntoIterator<Item = PartialRecord>,
{
    let mut aggregator = Aggregator::new();
    aggregator.merge(partials);
    aggregator.into_records()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DiscoverySource, TraversalRoot};
    use std::collections::HashSet;

    fn partial(slug: &str, root: TraversalRoot, page: u32) -> PartialRecord {
        PartialRecord::new(
            format!("https://example.com/agent/{}", slug),
            slug,
            DiscoverySource::new(root, page),
        )
    }

    fn category(name: &str) -> TraversalRoot {
        TraversalRoot::Category(name.to_string())
    }

    #[test]
    fn test_one_record_per_distinct_url() {
        let partials = vec![
            partial("a", TraversalRoot::Main, 1),
            partial("b", TraversalRoot::Main, 1),
            partial("a", category("writing"), 1),
            partial("c", category("writing"), 2),
            partial("b", category("coding"), 1),
            partial("a", category("coding"), 3),
        ];
        let distinct: HashSet<_> = partials.iter().map(|p| p.item_url.clone()).collect();

        let mut aggregator = Aggregator::new();
        let stats = aggregator.merge(partials);

        assert_eq!(aggregator.len(), distinct.len());
        assert_eq!(stats, MergeStats { created: 3, merged: 3 });
        let order: Vec<_> = aggregator.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_complementary_sightings_combine() {
        let mut with_title = partial("x", TraversalRoot::Main, 1);
        with_title.title = Some("X".to_string());

        let mut with_pricing = partial("x", category("writing"), 1);
        with_pricing.pricing_hint = Some("Free".to_string());

        let records = merge_partials(vec![with_title, with_pricing]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "X");
        assert_eq!(records[0].pricing.as_deref(), Some("Free"));
    }

    #[test]
    fn test_duplicate_partial_is_idempotent() {
        let mut p = partial("a", category("writing"), 1);
        p.title = Some("A".to_string());

        let once = merge_partials(vec![p.clone()]);
        let twice = merge_partials(vec![p.clone(), p]);

        assert_eq!(once, twice);
        assert_eq!(twice[0].categories, vec!["writing"]);
    }

    #[test]
    fn test_root_precedence_decides_scalars() {
        let mut from_main = partial("a", TraversalRoot::Main, 1);
        from_main.title = Some("From main".to_string());
        let mut from_category = partial("a", category("writing"), 1);
        from_category.title = Some("From category".to_string());

        let records = merge_partials(vec![from_main, from_category]);
        assert_eq!(records[0].title, "From main");
        assert_eq!(records[0].source, "main:page:1");
    }

    #[test]
    fn test_page_order_within_root_does_not_change_scalars() {
        let mut page1 = partial("a", category("writing"), 1);
        page1.title = Some("A".to_string());
        let mut page2 = partial("a", category("writing"), 2);
        page2.pricing_hint = Some("Paid".to_string());

        let forward = merge_partials(vec![page1.clone(), page2.clone()]);
        let backward = merge_partials(vec![page2, page1]);

        assert_eq!(forward[0].title, backward[0].title);
        assert_eq!(forward[0].pricing, backward[0].pricing);
        assert_eq!(forward[0].categories, backward[0].categories);
    }

    #[test]
    fn test_get_and_records_mut() {
        let mut aggregator = Aggregator::new();
        aggregator.merge(vec![partial("a", TraversalRoot::Main, 1)]);

        aggregator.records_mut()[0].enriched = true;
        assert!(aggregator.get("https://example.com/agent/a").unwrap().enriched);
        assert!(aggregator.get("https://example.com/agent/zzz").is_none());
    }
}
