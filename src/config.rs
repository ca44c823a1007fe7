//! # Scraper Configuration Module
//!
//! Configuration for a scrape run: where the catalog lives, which selectors
//! pick links and fields out of its pages, how many detail pages may be in
//! flight at once, and where the CSV output and error log go.
//!
//! ## Key Components
//!
//! - `ScraperConfig`: everything a run needs, with defaults for the
//!   shirts4mike catalog
//! - `SelectorConfig`: CSS selectors for the listing and detail pages
//! - `ScraperConfigBuilder`: builder for overriding individual settings

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the catalog site
pub const DEFAULT_SITE_BASE: &str = "http://www.shirts4mike.com";

/// Listing page holding every shirt link
pub const DEFAULT_ENTRY_URL: &str = "http://www.shirts4mike.com/shirts.php";

/// Directory the dated CSV files are written to
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// Append-only error log
pub const DEFAULT_LOG_FILE: &str = "scraper-error.log";

/// CSS selectors used to pull links and fields out of catalog pages
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    /// One node per product on the listing page
    pub listing_item: String,

    /// Anchor inside a product node whose `href` is the detail link
    pub listing_link: String,

    /// Container on the detail page that scopes the field selectors
    pub detail_container: String,

    /// Title element, text content
    pub title: String,

    /// Price element, text content
    pub price: String,

    /// Image element, `src` attribute
    pub image: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_item: ".products li".to_string(),
            listing_link: "a".to_string(),
            detail_container: "#content .wrapper".to_string(),
            title: ".shirt-details h1".to_string(),
            price: ".shirt-details .price".to_string(),
            image: ".shirt-picture img".to_string(),
        }
    }
}

/// Configuration for a scrape run
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Site base that relative links and image paths are joined to
    pub site_base: String,

    /// Listing page URL
    pub entry_url: String,

    /// Directory for the dated CSV output
    pub output_dir: PathBuf,

    /// Error log path
    pub log_file: PathBuf,

    /// Maximum number of detail pages fetched at once
    pub max_concurrency: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Probe the entry URL before harvesting
    pub precheck: bool,

    /// User agent sent with every request
    pub user_agent: String,

    /// Page selectors
    pub selectors: SelectorConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site_base: DEFAULT_SITE_BASE.to_string(),
            entry_url: DEFAULT_ENTRY_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            max_concurrency: 8,
            timeout_secs: crate::http::DEFAULT_TIMEOUT_SECS,
            precheck: true,
            user_agent: format!("shirt-scraper/{}", env!("CARGO_PKG_VERSION")),
            selectors: SelectorConfig::default(),
        }
    }
}

/// Builder for ScraperConfig
#[derive(Debug, Default)]
pub struct ScraperConfigBuilder {
    config: ScraperConfig,
}

impl ScraperConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ScraperConfig::default(),
        }
    }

    /// Set the site base URL
    pub fn site_base(mut self, site_base: impl Into<String>) -> Self {
        self.config.site_base = site_base.into();
        self
    }

    /// Set the listing page URL
    pub fn entry_url(mut self, entry_url: impl Into<String>) -> Self {
        self.config.entry_url = entry_url.into();
        self
    }

    /// Set the CSV output directory
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = output_dir.into();
        self
    }

    /// Set the error log path
    pub fn log_file(mut self, log_file: impl Into<PathBuf>) -> Self {
        self.config.log_file = log_file.into();
        self
    }

    /// Set the maximum number of concurrent detail fetches
    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    /// Set the per-request timeout in seconds
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.timeout_secs = timeout_secs;
        self
    }

    /// Set whether the entry URL is probed first
    pub fn precheck(mut self, precheck: bool) -> Self {
        self.config.precheck = precheck;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the page selectors
    pub fn selectors(mut self, selectors: SelectorConfig) -> Self {
        self.config.selectors = selectors;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ScraperConfig {
        self.config
    }
}

impl ScraperConfig {
    /// Create a new builder
    pub fn builder() -> ScraperConfigBuilder {
        ScraperConfigBuilder::new()
    }

    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings a run cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(Error::Config("max_concurrency must be at least 1".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be at least 1".to_string()));
        }
        for (name, value) in [("site_base", &self.site_base), ("entry_url", &self.entry_url)] {
            url::Url::parse(value)
                .map_err(|e| Error::Config(format!("{} '{}' is not a URL: {}", name, value, e)))?;
        }
        Ok(())
    }
}
