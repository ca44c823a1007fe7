//! Detail page harvesting
//!
//! Every detail link gets its own task. A semaphore caps how many are fetching
//! at once, and each task reports exactly one `DetailOutcome` on the channel,
//! logging its own failure before it does.

use crate::aggregator::{DetailOutcome, FailedDetail};
use crate::error_log::ErrorLogger;
use crate::harvest::error::HarvestError;
use crate::harvest::extraction::{CompiledSelectors, extract_shirt};
use crate::http::HttpClient;
use crate::record::{Record, join_site_url};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, instrument};

/// Everything a detail task needs, cheap to clone
#[derive(Debug, Clone)]
pub struct DetailContext {
    /// Shared HTTP client
    pub client: HttpClient,

    /// Site base for detail and image URLs
    pub site_base: Arc<str>,

    /// Compiled page selectors
    pub selectors: Arc<CompiledSelectors>,

    /// Failure reporting
    pub logger: ErrorLogger,

    /// Limits concurrent fetches
    pub semaphore: Arc<Semaphore>,
}

/// Fetch one detail page and build its record
#[instrument(skip(client, selectors))]
pub async fn harvest_detail(
    client: &HttpClient,
    site_base: &str,
    link: &str,
    selectors: &CompiledSelectors,
) -> Result<Record, HarvestError> {
    let url = join_site_url(site_base, link);
    let page = client.get(&url).await?.ensure_ok()?;
    let captured_at = Local::now();

    let raw = extract_shirt(&page.body, &page.url, selectors)?;
    Record::build(raw, &page.url, site_base, captured_at)
}

/// Spawn one task per link. Each sends a single outcome on `outcomes`;
/// the channel closes once every task has finished.
pub fn spawn_detail_tasks(
    links: Vec<String>,
    context: DetailContext,
    outcomes: mpsc::Sender<DetailOutcome>,
) -> Vec<JoinHandle<()>> {
    links
        .into_iter()
        .map(|link| {
            let context = context.clone();
            let outcomes = outcomes.clone();
            let span = info_span!("detail", link = %link);

            tokio::spawn(
                async move {
                    let outcome = run_detail(&context, &link).await;
                    if outcomes.send(outcome).await.is_err() {
                        debug!("Outcome receiver dropped");
                    }
                }
                .instrument(span),
            )
        })
        .collect()
}

async fn run_detail(context: &DetailContext, link: &str) -> DetailOutcome {
    let result = match context.semaphore.clone().acquire_owned().await {
        Ok(_permit) => {
            harvest_detail(&context.client, &context.site_base, link, &context.selectors).await
        }
        Err(e) => Err(HarvestError::from(e)),
    };

    match result {
        Ok(record) => {
            debug!("Scraped {}", record.url);
            DetailOutcome::Scraped(record)
        }
        Err(e) => {
            context.logger.log(&e).await;
            DetailOutcome::Failed(FailedDetail {
                url: join_site_url(&context.site_base, link),
                error: e.to_string(),
            })
        }
    }
}
