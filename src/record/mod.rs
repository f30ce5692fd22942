//! Record module: the crawl's data model and merge rules
//!
//! # Components
//!
//! - `Category`: a traversal root discovered on the category index
//! - `PartialRecord`: one sighting of an item link on a listing page
//! - `DetailFields`: what an item's detail page contributes
//! - `CanonicalRecord`: the merged record for one item URL
//! - `Aggregator`: the index that owns canonical records for a run

mod aggregator;
mod canonical;
mod category;
mod detail;
mod partial;

pub use aggregator::{merge_partials, Aggregator, MergeStats};
pub use canonical::CanonicalRecord;
pub use category::Category;
pub use detail::{DetailFields, DETAILED_TITLE, LONG_DESCRIPTION, META_DESCRIPTION, PRICING_INFO};
pub use partial::{DiscoverySource, PartialRecord, TraversalRoot};
