//! Connectivity probe run before the listing is harvested

use crate::harvest::error::HarvestError;
use crate::http::HttpClient;
use tracing::{info, instrument};

/// GET the entry URL once and fail fast unless it answers 200
#[instrument(skip(client))]
pub async fn check_connectivity(client: &HttpClient, entry_url: &str) -> Result<(), HarvestError> {
    client.get(entry_url).await?.ensure_ok_for(entry_url)?;
    info!("{} is reachable", entry_url);
    Ok(())
}
