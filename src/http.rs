//! HTTP client used by every stage of the scraper
//!
//! Wraps `reqwest` and hands back the status, reason phrase, final URL and
//! body of a GET without judging the status code; each harvester decides what
//! a non-200 means for its stage.

use crate::harvest::HarvestError;
use reqwest::{Client as ReqwestClient, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Response status
    pub status: StatusCode,

    /// URL of the response after redirects
    pub url: String,

    /// Response body
    pub body: String,
}

impl FetchedPage {
    /// Whether the server answered 200 OK
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }

    /// Canonical reason phrase for the status, e.g. "Not Found"
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Unknown Status")
    }

    /// Turn a non-200 response into a status error naming the final URL
    pub fn ensure_ok(self) -> Result<Self, HarvestError> {
        let url = self.url.clone();
        self.ensure_ok_for(&url)
    }

    /// Like [`ensure_ok`](Self::ensure_ok), but the error names `requested`
    /// instead of the URL the redirects ended on
    pub fn ensure_ok_for(self, requested: &str) -> Result<Self, HarvestError> {
        if self.is_ok() {
            Ok(self)
        } else {
            Err(HarvestError::Status {
                url: requested.to_string(),
                reason: self.reason().to_string(),
                code: self.status.as_u16(),
            })
        }
    }
}

/// HTTP client for fetching catalog pages
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Create a client with a user agent and per-request timeout
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, HarvestError> {
        let client = ReqwestClient::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(HarvestError::from_transport)?;

        Ok(Self { client })
    }

    /// GET a URL. Transport failures become `HarvestError::Connection`.
    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, url: &str) -> Result<FetchedPage, HarvestError> {
        debug!("Sending GET request to {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(HarvestError::from_transport)?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(HarvestError::from_transport)?;

        debug!("{} answered {} ({} bytes)", final_url, status, body.len());

        Ok(FetchedPage {
            status,
            url: final_url,
            body,
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}
