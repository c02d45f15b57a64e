//! Aggregation: order classified items and wrap them into a [`ScanResult`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::analyze::{ClassifiedItem, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Polarity ascending: most negative first.
    #[default]
    BySeverity,
    /// Normalized date descending; unknown dates last.
    ByRecency,
}

impl FromStr for SortMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "severity" | "by_severity" | "sentiment" => Ok(SortMode::BySeverity),
            "recency" | "by_recency" | "date" => Ok(SortMode::ByRecency),
            other => anyhow::bail!("unknown sort mode `{other}`"),
        }
    }
}

/// Pipeline counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Fetch requests issued (one per slice).
    pub slices: usize,
    /// Slices that failed or timed out and contributed nothing.
    pub failed_slices: usize,
    /// Entries received across all slices.
    pub raw_entries: usize,
    /// Dropped by the excluded-term filter.
    pub excluded: usize,
    /// Dropped as repeats of an earlier entry.
    pub duplicates: usize,
}

/// Ordered outcome of one scan. Replaced wholesale by the next scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub window: String,
    pub sort: SortMode,
    pub items: Vec<ClassifiedItem>,
    /// Number of items before any display-time filtering.
    pub total_before_filter: usize,
    #[serde(default)]
    pub stats: ScanStats,
    pub scanned_at: DateTime<Utc>,
}

impl ScanResult {
    pub fn with_meta(mut self, target: &str, window: &str, stats: ScanStats) -> Self {
        self.target = target.to_string();
        self.window = window.to_string();
        self.stats = stats;
        self
    }

    /// "No intelligence found": nothing survived filtering.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_at(&self, level: RiskLevel) -> usize {
        self.items.iter().filter(|i| i.risk == level).count()
    }
}

// `partial_cmp` so that -0.0 and 0.0 tie; NaN (never produced) ties with everything.
fn severity_order(a: &ClassifiedItem, b: &ClassifiedItem) -> Ordering {
    a.sentiment
        .partial_cmp(&b.sentiment)
        .unwrap_or(Ordering::Equal)
}

fn recency_order(a: &ClassifiedItem, b: &ClassifiedItem) -> Ordering {
    // Option orders None < Some, so reversing puts unknown dates last.
    b.date.cmp(&a.date)
}

/// Stable sort by the requested mode; ties keep input order.
pub fn aggregate(mut items: Vec<ClassifiedItem>, mode: SortMode) -> ScanResult {
    match mode {
        SortMode::BySeverity => items.sort_by(severity_order),
        SortMode::ByRecency => items.sort_by(recency_order),
    }
    ScanResult {
        target: String::new(),
        window: String::new(),
        sort: mode,
        total_before_filter: items.len(),
        items,
        stats: ScanStats::default(),
        scanned_at: Utc::now(),
    }
}
