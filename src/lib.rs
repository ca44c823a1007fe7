//! # Shirt Scraper
//!
//! Scrapes a shirt catalog into a dated CSV file. The listing page yields one
//! link per shirt; every detail page is fetched, its title, price and image are
//! extracted and normalized, and the collected records are written to
//! `data/<YYYY-MM-D>.csv` once every link has settled. Fetch and parse
//! failures are reported on the console and appended to `scraper-error.log`.
//!
//! ## Features
//!
//! - Optional connectivity probe of the entry URL
//! - Bounded concurrent detail fetches with per-request timeouts
//! - Deterministic completion: failed pages settle too, so the CSV is
//!   always written with whatever was collected
//! - Structured logging with `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use shirt_scraper::{Pipeline, ScraperConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScraperConfig::builder().max_concurrency(4).build();
//!     let summary = Pipeline::new(config)?.run().await?;
//!
//!     println!("{} shirts written", summary.records_written);
//!     std::process::exit(summary.status.exit_code());
//! }
//! ```

mod error;

pub mod aggregator;
pub mod config;
pub mod error_log;
pub mod harvest;
pub mod http;
pub mod pipeline;
pub mod record;
pub mod storage;

pub use config::{ScraperConfig, SelectorConfig};
pub use error::Error;
pub use pipeline::{Pipeline, ProgressEvent, RunStatus, RunSummary};
pub use record::Record;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
