// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ingest::window::FetchWindow;

/// Display name used when a feed entry carries no `<source>`.
pub const DEFAULT_SOURCE: &str = "Google News";
/// Placeholder for entries without a publication timestamp.
pub const UNKNOWN_PUBLISHED: &str = "unknown";

/// One feed entry as delivered by a fetcher. Only `title` and `link` are required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl RawEntry {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            published: None,
            summary: None,
            source: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_published(mut self, published: impl Into<String>) -> Self {
        self.published = Some(published.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Summary text, empty when the feed omitted it.
    pub fn summary_text(&self) -> &str {
        self.summary.as_deref().unwrap_or_default()
    }

    /// Raw publication text, `"unknown"` when missing or blank.
    pub fn published_text(&self) -> &str {
        match self.published.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p,
            _ => UNKNOWN_PUBLISHED,
        }
    }

    pub fn source_name(&self) -> &str {
        match self.source.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => DEFAULT_SOURCE,
        }
    }
}

/// Boundary to the feed source: one call per fetch window.
///
/// Returning an empty vec is a normal "nothing matched"; errors are treated by the
/// scanner as an empty slice.
#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, query: &str, window: &FetchWindow) -> Result<Vec<RawEntry>>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_optional_fields_get_defaults() {
        let e = RawEntry::new("Title", "https://x.test/1");
        assert_eq!(e.summary_text(), "");
        assert_eq!(e.published_text(), "unknown");
        assert_eq!(e.source_name(), "Google News");
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let e = RawEntry::new("Title", "https://x.test/1")
            .with_published("   ")
            .with_source("");
        assert_eq!(e.published_text(), "unknown");
        assert_eq!(e.source_name(), "Google News");
    }
}
