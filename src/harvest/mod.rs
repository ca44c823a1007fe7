//! # Catalog Harvesting Module
//!
//! Fetches the catalog's listing page, follows every product link to its
//! detail page, and turns each detail page into a `Record`.
//!
//! ## Key Components
//!
//! - `check_connectivity`: optional probe of the entry URL
//! - `harvest_listing`: detail links from the listing page, in document order
//! - `harvest_detail` / `spawn_detail_tasks`: per-link fetch and extraction,
//!   bounded by a semaphore
//! - `CompiledSelectors`: the configured CSS selectors, parsed once per run
//! - `HarvestError`: status, connection and extraction failures

mod detail;
mod error;
mod extraction;
mod listing;
mod precheck;

pub use detail::{DetailContext, harvest_detail, spawn_detail_tasks};
pub use error::HarvestError;
pub use extraction::{CompiledSelectors, extract_links, extract_shirt};
pub use listing::harvest_listing;
pub use precheck::check_connectivity;
