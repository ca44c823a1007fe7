//! Collects detail outcomes and decides when the run is ready to persist
//!
//! The aggregator knows how many detail links were dispatched. Every outcome,
//! success or failure, settles one of them; when all have settled the collected
//! records are handed out exactly once.

use crate::record::Record;
use serde::Serialize;
use tracing::{debug, warn};

/// Result of harvesting one detail link
#[derive(Debug, Clone)]
pub enum DetailOutcome {
    /// The page was fetched and parsed
    Scraped(Record),

    /// The page could not be fetched or parsed
    Failed(FailedDetail),
}

/// A detail link that did not produce a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDetail {
    /// Detail URL that was requested
    pub url: String,

    /// Reported error
    pub error: String,
}

/// Everything collected once the run has settled
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    /// Number of detail links dispatched
    pub expected: usize,

    /// Records in settlement order
    pub records: Vec<Record>,

    /// Links that failed with an error
    pub failures: Vec<FailedDetail>,

    /// Links whose task ended without reporting an outcome
    pub abandoned: usize,
}

impl Harvest {
    /// Number of links that produced no record
    pub fn failed(&self) -> usize {
        self.failures.len() + self.abandoned
    }
}

/// Latching collector for detail outcomes
#[derive(Debug)]
pub struct Aggregator {
    expected: usize,
    records: Vec<Record>,
    failures: Vec<FailedDetail>,
    fired: bool,
}

impl Aggregator {
    /// Create an aggregator expecting `expected` outcomes
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            records: Vec::with_capacity(expected),
            failures: Vec::new(),
            fired: false,
        }
    }

    /// Outcomes settled so far
    pub fn settled(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    /// Whether the harvest has already been handed out
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Record one outcome. Returns the harvest when this outcome settles the
    /// last expected link, and `None` otherwise or after the latch has fired.
    pub fn settle(&mut self, outcome: DetailOutcome) -> Option<Harvest> {
        if self.fired {
            warn!("Ignoring detail outcome received after the harvest was persisted");
            return None;
        }

        match outcome {
            DetailOutcome::Scraped(record) => self.records.push(record),
            DetailOutcome::Failed(failure) => self.failures.push(failure),
        }
        debug!("Settled {}/{}", self.settled(), self.expected);

        if self.settled() >= self.expected {
            Some(self.fire(0))
        } else {
            None
        }
    }

    /// Fire with whatever has settled, counting unsettled links as abandoned.
    /// Used when no more outcomes can arrive. Returns `None` if already fired.
    pub fn finish(&mut self) -> Option<Harvest> {
        if self.fired {
            return None;
        }

        let abandoned = self.expected.saturating_sub(self.settled());
        if abandoned > 0 {
            warn!("{} detail tasks ended without reporting", abandoned);
        }
        Some(self.fire(abandoned))
    }

    fn fire(&mut self, abandoned: usize) -> Harvest {
        self.fired = true;
        Harvest {
            expected: self.expected,
            records: std::mem::take(&mut self.records),
            failures: std::mem::take(&mut self.failures),
            abandoned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn record(id: u32) -> DetailOutcome {
        DetailOutcome::Scraped(Record {
            title: format!("Shirt {}", id),
            price: "$18".to_string(),
            image_url: format!("http://example.com/img/{}.jpg", id),
            url: format!("http://example.com/shirt.php?id={}", id),
            time: Local::now(),
        })
    }

    fn failure(id: u32) -> DetailOutcome {
        DetailOutcome::Failed(FailedDetail {
            url: format!("http://example.com/shirt.php?id={}", id),
            error: "Internal Server Error (500)".to_string(),
        })
    }

    #[test]
    fn test_fires_once_all_succeed() {
        let mut aggregator = Aggregator::new(3);

        assert!(aggregator.settle(record(2)).is_none());
        assert!(aggregator.settle(record(1)).is_none());
        let harvest = aggregator.settle(record(3)).unwrap();

        assert_eq!(harvest.records.len(), 3);
        assert_eq!(harvest.failed(), 0);
        // Settlement order, not link order
        assert_eq!(harvest.records[0].title, "Shirt 2");
        assert!(aggregator.has_fired());
    }

    #[test]
    fn test_failures_count_toward_settlement() {
        let mut aggregator = Aggregator::new(3);

        assert!(aggregator.settle(record(1)).is_none());
        assert!(aggregator.settle(failure(2)).is_none());
        let harvest = aggregator.settle(record(3)).unwrap();

        assert_eq!(harvest.records.len(), 2);
        assert_eq!(harvest.failures.len(), 1);
        assert_eq!(harvest.failed(), 1);
    }

    #[test]
    fn test_latch_does_not_refire() {
        let mut aggregator = Aggregator::new(1);

        assert!(aggregator.settle(record(1)).is_some());
        assert!(aggregator.settle(record(2)).is_none());
        assert!(aggregator.finish().is_none());
    }

    #[test]
    fn test_finish_counts_missing_outcomes() {
        let mut aggregator = Aggregator::new(4);
        aggregator.settle(record(1));
        aggregator.settle(failure(2));

        let harvest = aggregator.finish().unwrap();
        assert_eq!(harvest.records.len(), 1);
        assert_eq!(harvest.abandoned, 2);
        assert_eq!(harvest.failed(), 3);
    }

    #[test]
    fn test_empty_listing_fires_on_finish() {
        let mut aggregator = Aggregator::new(0);
        let harvest = aggregator.finish().unwrap();

        assert_eq!(harvest.expected, 0);
        assert!(harvest.records.is_empty());
        assert_eq!(harvest.failed(), 0);
    }
}
