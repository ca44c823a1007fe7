//! # Scrape Pipeline
//!
//! Runs one scrape end to end: optional connectivity probe, listing harvest,
//! bounded detail fan-out, aggregation, and a single CSV write once every
//! detail link has settled.
//!
//! Connectivity failures on the entry URL stop the run before anything is
//! written. Failed detail pages are logged and left out; the remaining records
//! are still written and the run reports a partial harvest.

use crate::aggregator::{Aggregator, DetailOutcome, FailedDetail, Harvest};
use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::error_log::ErrorLogger;
use crate::harvest::{
    CompiledSelectors, DetailContext, check_connectivity, harvest_listing, spawn_detail_tasks,
};
use crate::http::HttpClient;
use crate::storage::CsvStorage;
use chrono::Local;
use futures::future;
use indicatif::ProgressBar;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, info, instrument, warn};

/// Exit code when the CSV output could not be written
pub const EXIT_OUTPUT_FAILURE: i32 = 3;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every discovered link produced a record
    Success,

    /// The entry URL could not be reached or did not answer 200
    ConnectivityFailure,

    /// At least one detail page failed
    PartialHarvest,
}

impl RunStatus {
    /// Process exit code for this status
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::ConnectivityFailure => 1,
            RunStatus::PartialHarvest => 2,
        }
    }
}

/// Outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// How the run ended, mapped to the process exit code
    pub status: RunStatus,

    /// Detail links found on the listing page
    pub links_found: usize,

    /// Records written to the CSV file
    pub records_written: usize,

    /// Detail links that produced no record
    pub failures: Vec<FailedDetail>,

    /// Detail tasks that never reported
    pub abandoned: usize,

    /// CSV file, if one was written
    pub output_path: Option<PathBuf>,
}

impl RunSummary {
    fn connectivity_failure() -> Self {
        Self {
            status: RunStatus::ConnectivityFailure,
            links_found: 0,
            records_written: 0,
            failures: Vec::new(),
            abandoned: 0,
            output_path: None,
        }
    }
}

/// Progress updates for interactive front ends
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The listing page yielded this many detail links
    LinksFound(usize),

    /// One detail link settled
    DetailSettled {
        /// Detail URL
        url: String,
        /// Whether a record was produced
        scraped: bool,
    },
}

/// A configured scrape run
#[derive(Debug)]
pub struct Pipeline {
    config: ScraperConfig,
    client: HttpClient,
    selectors: Arc<CompiledSelectors>,
    storage: CsvStorage,
    logger: ErrorLogger,
    progress: Option<mpsc::Sender<ProgressEvent>>,
}

impl Pipeline {
    /// Validate the configuration and prepare the HTTP client and selectors
    pub fn new(config: ScraperConfig) -> Result<Self> {
        config.validate()?;

        let client = HttpClient::new(&config.user_agent, config.timeout())?;
        let selectors = Arc::new(CompiledSelectors::compile(&config.selectors)?);
        let storage = CsvStorage::new(config.output_dir.clone());
        let logger = ErrorLogger::new(config.log_file.clone());

        Ok(Self {
            config,
            client,
            selectors,
            storage,
            logger,
            progress: None,
        })
    }

    /// Send progress events to `sender` while running
    pub fn with_progress(mut self, sender: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Keep failure messages on the console clear of `progress_bar`
    pub fn with_progress_bar(mut self, progress_bar: ProgressBar) -> Self {
        self.logger = self.logger.with_progress_bar(progress_bar);
        self
    }

    /// Run the scrape. Network failures are logged and reflected in the
    /// summary; only failures to write output are returned as errors.
    #[instrument(skip(self), fields(entry_url = %self.config.entry_url))]
    pub async fn run(&self) -> Result<RunSummary> {
        if let Err(e) = self.storage.ensure_output_dir().await {
            self.logger.log(&e).await;
            return Err(e.into());
        }

        if self.config.precheck {
            if let Err(e) = check_connectivity(&self.client, &self.config.entry_url).await {
                self.logger.log(&e).await;
                return Ok(RunSummary::connectivity_failure());
            }
        }

        let links = match harvest_listing(&self.client, &self.config.entry_url, &self.selectors)
            .await
        {
            Ok(links) => links,
            Err(e) => {
                self.logger.log(&e).await;
                return Ok(RunSummary::connectivity_failure());
            }
        };
        let links_found = links.len();
        self.report(ProgressEvent::LinksFound(links_found)).await;

        let harvest = self.harvest_details(links).await;

        let output_path = if harvest.records.is_empty() {
            warn!("No records collected, nothing to write");
            None
        } else {
            match self
                .storage
                .write(&harvest.records, Local::now().date_naive())
                .await
            {
                Ok(path) => Some(path),
                Err(e) => {
                    self.logger.log(&e).await;
                    return Err(Error::from(e));
                }
            }
        };

        let status = if harvest.failed() > 0 {
            RunStatus::PartialHarvest
        } else {
            RunStatus::Success
        };
        info!(
            "Run finished: {} of {} links scraped ({:?})",
            harvest.records.len(),
            links_found,
            status
        );

        Ok(RunSummary {
            status,
            links_found,
            records_written: harvest.records.len(),
            failures: harvest.failures,
            abandoned: harvest.abandoned,
            output_path,
        })
    }

    async fn harvest_details(&self, links: Vec<String>) -> Harvest {
        let context = DetailContext {
            client: self.client.clone(),
            site_base: Arc::from(self.config.site_base.as_str()),
            selectors: self.selectors.clone(),
            logger: self.logger.clone(),
            semaphore: Arc::new(Semaphore::new(self.config.max_concurrency)),
        };

        let mut aggregator = Aggregator::new(links.len());
        let (tx, mut rx) = mpsc::channel(links.len().max(1));
        let handles = spawn_detail_tasks(links, context, tx);

        let harvest = loop {
            match rx.recv().await {
                Some(outcome) => {
                    let event = match &outcome {
                        DetailOutcome::Scraped(record) => ProgressEvent::DetailSettled {
                            url: record.url.clone(),
                            scraped: true,
                        },
                        DetailOutcome::Failed(failure) => ProgressEvent::DetailSettled {
                            url: failure.url.clone(),
                            scraped: false,
                        },
                    };
                    self.report(event).await;

                    if let Some(harvest) = aggregator.settle(outcome) {
                        break harvest;
                    }
                }
                // Every sender is gone: either there were no links or a task died
                None => break aggregator.finish().unwrap_or_default(),
            }
        };

        for result in future::join_all(handles).await {
            if let Err(e) = result {
                debug!("Detail task failed: {}", e);
            }
        }

        harvest
    }

    async fn report(&self, event: ProgressEvent) {
        if let Some(sender) = &self.progress {
            // Ignore errors from sending (e.g., if receiver is dropped)
            let _ = sender.send(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(RunStatus::Success.exit_code(), 0);
        assert_eq!(RunStatus::ConnectivityFailure.exit_code(), 1);
        assert_eq!(RunStatus::PartialHarvest.exit_code(), 2);
        assert_eq!(EXIT_OUTPUT_FAILURE, 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScraperConfig::builder().max_concurrency(0).build();
        assert!(matches!(Pipeline::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_summary_serializes_status_in_snake_case() {
        let json = serde_json::to_value(RunSummary::connectivity_failure()).unwrap();
        assert_eq!(json["status"], "connectivity_failure");
        assert_eq!(json["links_found"], 0);
    }
}
