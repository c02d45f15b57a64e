//! Prometheus exposition for the scan pipeline counters.

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        describe_all();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe_all() {
    describe_counter!("scan_runs_total", "Completed scans");
    describe_counter!("scan_raw_entries_total", "Entries received from the feed");
    describe_counter!("scan_excluded_total", "Entries dropped by excluded terms");
    describe_counter!("scan_duplicates_total", "Entries dropped as duplicates");
    describe_counter!("scan_slice_errors_total", "Slice fetches that failed or timed out");
    describe_counter!("scan_superseded_total", "Scan results discarded as superseded");
    describe_counter!("classify_fallback_total", "Items scored 0.0 after a scorer failure");
    describe_counter!("ingest_events_total", "Feed items parsed");
    describe_histogram!("scan_duration_ms", Unit::Milliseconds, "Wall time of one scan");
    describe_histogram!("ingest_parse_ms", Unit::Milliseconds, "Feed parse time");
    describe_gauge!("scan_last_run_ts", Unit::Seconds, "Unix time of the last scan");
}
