//! Error types for the harvest module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for fetching and extracting catalog pages
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Server answered with something other than 200
    #[error("Error connecting to {url} {reason} ({code})")]
    Status {
        /// Requested URL
        url: String,
        /// Canonical reason phrase
        reason: String,
        /// HTTP status code
        code: u16,
    },

    /// DNS, connect, timeout or body read failure
    #[error("Error with hostname: {host} or connection")]
    Connection {
        /// Host of the failing request
        host: String,
        /// Underlying transport error text
        detail: String,
    },

    /// A detail page lacked an expected field
    #[error("Missing {field} on {url}")]
    MissingField {
        /// Detail page URL
        url: String,
        /// Field that could not be extracted
        field: &'static str,
    },

    /// A configured CSS selector does not parse
    #[error("Invalid selector {0}")]
    Selector(String),

    /// A detail task could not run to completion
    #[error("Task error: {0}")]
    Task(String),
}

impl HarvestError {
    /// Classify a transport failure by the host it was talking to
    pub fn from_transport(err: reqwest::Error) -> Self {
        let host = err
            .url()
            .and_then(|u| u.host_str())
            .unwrap_or("unknown")
            .to_string();

        Self::Connection {
            host,
            detail: err.to_string(),
        }
    }

    /// Whether this failure means the site could not be reached
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Connection { .. })
    }
}

impl From<reqwest::Error> for HarvestError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_transport(err)
    }
}

impl From<tokio::sync::AcquireError> for HarvestError {
    fn from(err: tokio::sync::AcquireError) -> Self {
        Self::Task(format!("Failed to acquire semaphore: {}", err))
    }
}

impl From<HarvestError> for CrateError {
    fn from(err: HarvestError) -> Self {
        CrateError::Harvest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_embeds_url_reason_and_code() {
        let err = HarvestError::Status {
            url: "http://www.shirts4mike.com/shirts.php".to_string(),
            reason: "Not Found".to_string(),
            code: 404,
        };

        assert_eq!(
            err.to_string(),
            "Error connecting to http://www.shirts4mike.com/shirts.php Not Found (404)"
        );
        assert!(err.is_connectivity());
    }

    #[test]
    fn test_missing_field_is_not_connectivity() {
        let err = HarvestError::MissingField {
            url: "http://example.com/shirt.php?id=101".to_string(),
            field: "title",
        };

        assert!(!err.is_connectivity());
        assert_eq!(err.to_string(), "Missing title on http://example.com/shirt.php?id=101");
    }
}
