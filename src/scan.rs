// src/scan.rs
//! Scan orchestration: resolve the window, fan out one fetch per slice through a
//! bounded pool, wait for all of them, then filter → classify → aggregate.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::aggregate::{aggregate, ScanResult, ScanStats, SortMode};
use crate::analyze::Classifier;
use crate::config::SentinelConfig;
use crate::ingest::types::{FeedFetcher, RawEntry};
use crate::ingest::window::{FetchWindow, TimeWindow};
use crate::ingest::{filter_entries, DedupPolicy};

/// What to scan: a labelled target, its search expression, and a time window.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanQuery {
    pub target: String,
    pub query: String,
    pub window_label: String,
    pub window: TimeWindow,
}

impl ScanQuery {
    /// Look up a configured target and window preset (default window when `None`).
    pub fn from_config(cfg: &SentinelConfig, target: &str, window: Option<&str>) -> Result<Self> {
        let t = cfg
            .target(target)
            .ok_or_else(|| anyhow!("unknown target `{target}`"))?;
        let label = window.unwrap_or(&cfg.default_window);
        let w = cfg
            .window(label)
            .ok_or_else(|| anyhow!("unknown window `{label}`"))?;
        Ok(Self {
            target: t.name.clone(),
            query: t.query.clone(),
            window_label: w.label.clone(),
            window: w.window,
        })
    }
}

/// Runs scans. Holds no per-scan state, so one instance serves every request.
pub struct Scanner {
    fetcher: Arc<dyn FeedFetcher>,
    classifier: Arc<Classifier>,
    excluded_terms: Vec<String>,
    dedup: DedupPolicy,
    concurrency: usize,
    slice_timeout: Duration,
}

impl Scanner {
    pub fn new(
        fetcher: Arc<dyn FeedFetcher>,
        classifier: Arc<Classifier>,
        excluded_terms: Vec<String>,
        dedup: DedupPolicy,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            excluded_terms,
            dedup,
            concurrency: 4,
            slice_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_config(
        cfg: &SentinelConfig,
        fetcher: Arc<dyn FeedFetcher>,
        classifier: Arc<Classifier>,
    ) -> Self {
        Self::new(fetcher, classifier, cfg.excluded_terms.clone(), cfg.dedup)
            .with_concurrency(cfg.fetch.concurrency)
            .with_slice_timeout(Duration::from_secs(cfg.fetch.timeout_secs))
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn with_slice_timeout(mut self, t: Duration) -> Self {
        self.slice_timeout = t;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Scan relative to today's UTC date.
    pub async fn run(&self, q: &ScanQuery, mode: SortMode) -> Result<ScanResult> {
        self.run_on(q, mode, Utc::now().date_naive()).await
    }

    /// Scan with an explicit "today" (slice boundaries depend on it).
    ///
    /// Only an unresolvable window is an error; fetch failures shrink the result.
    pub async fn run_on(
        &self,
        q: &ScanQuery,
        mode: SortMode,
        today: NaiveDate,
    ) -> Result<ScanResult> {
        let t0 = Instant::now();
        let windows = q
            .window
            .resolve(today)
            .with_context(|| format!("resolving window `{}`", q.window_label))?;

        let (raw, failed_slices) = self.fetch_all(&q.query, &windows).await;
        let raw_entries = raw.len();

        let filtered = filter_entries(raw, &self.excluded_terms, self.dedup);
        let items = self.classifier.classify_all(&filtered.kept);

        let stats = ScanStats {
            slices: windows.len(),
            failed_slices,
            raw_entries,
            excluded: filtered.excluded,
            duplicates: filtered.duplicates,
        };
        let result = aggregate(items, mode).with_meta(&q.target, &q.window_label, stats);

        counter!("scan_runs_total").increment(1);
        counter!("scan_raw_entries_total").increment(raw_entries as u64);
        counter!("scan_excluded_total").increment(filtered.excluded as u64);
        counter!("scan_duplicates_total").increment(filtered.duplicates as u64);
        histogram!("scan_duration_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("scan_last_run_ts").set(result.scanned_at.timestamp() as f64);

        tracing::info!(
            target: "scan",
            target_name = %q.target,
            window = %q.window_label,
            slices = stats.slices,
            failed = stats.failed_slices,
            raw = stats.raw_entries,
            excluded = stats.excluded,
            dedup = stats.duplicates,
            kept = result.items.len(),
            "scan complete"
        );

        Ok(result)
    }

    /// Fetch every slice (at most `concurrency` in flight) and concatenate in
    /// slice order. Returns the entries and the number of failed slices.
    async fn fetch_all(&self, query: &str, windows: &[FetchWindow]) -> (Vec<RawEntry>, usize) {
        let batches: Vec<Option<Vec<RawEntry>>> = stream::iter(windows.iter().copied().enumerate())
            .map(|(idx, w)| self.fetch_slice(query, idx, w))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = batches.iter().filter(|b| b.is_none()).count();
        let raw = batches.into_iter().flatten().flatten().collect();
        (raw, failed)
    }

    /// `None` when the slice failed or timed out.
    async fn fetch_slice(&self, query: &str, idx: usize, w: FetchWindow) -> Option<Vec<RawEntry>> {
        match tokio::time::timeout(self.slice_timeout, self.fetcher.fetch(query, &w)).await {
            Ok(Ok(entries)) => {
                tracing::debug!(target: "ingest", slice = idx, n = entries.len(), "slice fetched");
                Some(entries)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    target: "ingest",
                    slice = idx,
                    provider = self.fetcher.name(),
                    error = ?e,
                    "slice fetch failed; treating as empty"
                );
                counter!("scan_slice_errors_total").increment(1);
                None
            }
            Err(_) => {
                tracing::warn!(
                    target: "ingest",
                    slice = idx,
                    provider = self.fetcher.name(),
                    timeout_ms = self.slice_timeout.as_millis() as u64,
                    "slice fetch timed out; treating as empty"
                );
                counter!("scan_slice_errors_total").increment(1);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_from_config_uses_default_window() {
        let cfg = SentinelConfig::default();
        let q = ScanQuery::from_config(&cfg, "taiwan strait", None).unwrap();
        assert_eq!(q.target, "Taiwan Strait");
        assert_eq!(q.window_label, "Last 7 Days");
        assert!(q.query.contains("TSMC"));
    }

    #[test]
    fn unknown_target_or_window_is_an_error() {
        let cfg = SentinelConfig::default();
        assert!(ScanQuery::from_config(&cfg, "Atlantis", None).is_err());
        assert!(ScanQuery::from_config(&cfg, "Taiwan Strait", Some("Eon")).is_err());
    }
}
