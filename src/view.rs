//! # View
//! Read-only projection of a [`ScanResult`] for the presentation layer:
//! an optional risk-level filter followed by pagination.
//!
//! Nothing here mutates the result or triggers a scan.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::aggregate::ScanResult;
use crate::analyze::{ClassifiedItem, RiskLevel};

/// Page-size policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub default_per_page: usize,
    pub per_page_options: Vec<usize>,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            default_per_page: 5,
            per_page_options: vec![5, 10, 25, 50],
        }
    }
}

impl ViewSettings {
    pub fn validate(&self) -> Result<()> {
        if self.per_page_options.iter().any(|&n| n == 0) {
            bail!("view.per_page_options must be positive");
        }
        if !self.per_page_options.contains(&self.default_per_page) {
            bail!(
                "view.default_per_page ({}) must be one of view.per_page_options",
                self.default_per_page
            );
        }
        Ok(())
    }

    /// Requested page size if allowed, default otherwise.
    pub fn per_page(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(n) if self.per_page_options.contains(&n) => n,
            _ => self.default_per_page.max(1),
        }
    }
}

/// Which risk levels the user wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RiskFilter {
    #[default]
    All,
    Only(RiskLevel),
}

impl RiskFilter {
    pub fn matches(&self, item: &ClassifiedItem) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::Only(level) => item.risk == *level,
        }
    }
}

impl FromStr for RiskFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim();
        if t.is_empty() || t.eq_ignore_ascii_case("all") {
            return Ok(RiskFilter::All);
        }
        Ok(RiskFilter::Only(t.parse()?))
    }
}

impl std::fmt::Display for RiskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskFilter::All => f.write_str("All"),
            RiskFilter::Only(l) => write!(f, "{l}"),
        }
    }
}

/// One page of a filtered result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    pub filter: String,
    /// Items in the whole result, before the risk filter.
    pub total_before_filter: usize,
    /// Items passing the risk filter.
    pub matched: usize,
    /// CRITICAL items among the matched ones.
    pub critical: usize,
    /// Zero-based page index actually served.
    pub page: usize,
    pub per_page: usize,
    /// Always at least 1, even for an empty match set.
    pub total_pages: usize,
    pub items: Vec<ClassifiedItem>,
}

/// Filter then paginate. Out-of-range pages fall back to the first page.
pub fn page_view(
    result: &ScanResult,
    filter: RiskFilter,
    page: usize,
    per_page: usize,
) -> PageView {
    let per_page = per_page.max(1);
    let matched: Vec<&ClassifiedItem> = result.items.iter().filter(|i| filter.matches(i)).collect();
    let critical = matched
        .iter()
        .filter(|i| i.risk == RiskLevel::Critical)
        .count();

    let total_pages = matched.len().div_ceil(per_page).max(1);
    let page = if page >= total_pages { 0 } else { page };

    let items = matched
        .iter()
        .skip(page * per_page)
        .take(per_page)
        .map(|i| (*i).clone())
        .collect();

    PageView {
        filter: filter.to_string(),
        total_before_filter: result.total_before_filter,
        matched: matched.len(),
        critical,
        page,
        per_page,
        total_pages,
        items,
    }
}
