//! Error types for the shirt scraper crate

use thiserror::Error;

/// Result type for scraper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for scraper operations
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Listing or detail harvesting error
    #[error("Harvest error: {0}")]
    Harvest(String),

    /// CSV output error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}
