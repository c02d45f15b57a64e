//! Application state shared by request handlers.
//!
//! The only mutable piece is [`CurrentScan`]: the last completed scan, swapped in
//! whole. Every scan takes a ticket when it starts; only the holder of the most
//! recent ticket may publish, so a slow superseded scan never overwrites a newer one.

use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use metrics::counter;

use crate::aggregate::ScanResult;
use crate::analyze::Classifier;
use crate::config::SentinelConfig;
use crate::ingest::providers::GoogleNewsFetcher;
use crate::ingest::types::FeedFetcher;
use crate::scan::Scanner;
use crate::sentiment::LexiconScorer;

/// Identifies one scan attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanTicket(u64);

#[derive(Debug, Default)]
pub struct CurrentScan {
    issued: AtomicU64,
    slot: RwLock<Option<Arc<ScanResult>>>,
}

impl CurrentScan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a scan; supersedes every earlier ticket.
    pub fn begin(&self) -> ScanTicket {
        ScanTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Store `result` if `ticket` is still the latest one. Returns whether it was stored.
    pub fn publish(&self, ticket: ScanTicket, result: ScanResult) -> bool {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        if ticket.0 != self.issued.load(Ordering::SeqCst) {
            counter!("scan_superseded_total").increment(1);
            tracing::debug!(target: "scan", ticket = ticket.0, "discarding superseded scan");
            return false;
        }
        *slot = Some(Arc::new(result));
        true
    }

    pub fn snapshot(&self) -> Option<Arc<ScanResult>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SentinelConfig>,
    pub scanner: Arc<Scanner>,
    pub current: Arc<CurrentScan>,
}

impl AppState {
    /// Build state around any fetcher (tests pass fixtures or mocks).
    pub fn new(config: SentinelConfig, fetcher: Arc<dyn FeedFetcher>) -> Result<Self> {
        let classifier = Arc::new(Classifier::from_config(
            &config,
            Arc::new(LexiconScorer::new()),
        )?);
        let scanner = Scanner::from_config(&config, fetcher, classifier);
        Ok(Self {
            config: Arc::new(config),
            scanner: Arc::new(scanner),
            current: Arc::new(CurrentScan::new()),
        })
    }

    /// Config from env/files, live Google News fetcher.
    pub fn from_env() -> Result<Self> {
        let config = SentinelConfig::load_default()?;
        let fetcher = GoogleNewsFetcher::from_settings(config.fetch.clone())?;
        Self::new(config, Arc::new(fetcher))
    }
}
