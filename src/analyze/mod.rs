// src/analyze/mod.rs
//! Risk classifier: entry → polarity → base level → critical-phrase override,
//! plus the informational root-cause category.
//!
//! Only the phrase override can produce CRITICAL. The category is reported next to
//! the level but never feeds back into it.

pub mod risk;
pub mod rules;
pub mod taxonomy;

use anyhow::Result;
use chrono::NaiveDate;
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::SentinelConfig;
use crate::ingest::date::{date_or_unknown, normalize_published};
use crate::ingest::types::RawEntry;
use crate::sentiment::{round2, LexiconScorer, PolarityScorer};

pub use risk::{RiskLevel, Thresholds};
pub use rules::CriticalPhrases;
pub use taxonomy::{Category, Taxonomy};

/// A scored feed entry. Built once per scan and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    /// Short stable id derived from the link (or title when the link is blank).
    pub id: String,
    pub title: String,
    pub link: String,
    pub source: String,
    pub summary: String,
    /// Publication text as received, `"unknown"` when absent.
    pub published: String,
    #[serde(with = "date_or_unknown")]
    pub date: Option<NaiveDate>,
    /// Polarity rounded to two decimals (never `-0.0`).
    pub sentiment: f64,
    pub risk: RiskLevel,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_phrase: Option<String>,
}

pub struct Classifier {
    scorer: Arc<dyn PolarityScorer>,
    thresholds: Thresholds,
    phrases: CriticalPhrases,
    taxonomy: Taxonomy,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("thresholds", &self.thresholds)
            .field("phrases", &self.phrases.len())
            .finish_non_exhaustive()
    }
}

impl Classifier {
    pub fn new(
        scorer: Arc<dyn PolarityScorer>,
        thresholds: Thresholds,
        phrases: CriticalPhrases,
        taxonomy: Taxonomy,
    ) -> Self {
        Self {
            scorer,
            thresholds,
            phrases,
            taxonomy,
        }
    }

    /// Compile phrase and category tables from configuration.
    pub fn from_config(cfg: &SentinelConfig, scorer: Arc<dyn PolarityScorer>) -> Result<Self> {
        cfg.thresholds.validate()?;
        Ok(Self::new(
            scorer,
            cfg.thresholds,
            CriticalPhrases::compile(&cfg.critical_phrases)?,
            Taxonomy::compile(&cfg.taxonomy)?,
        ))
    }

    /// Built-in tables with the bundled lexicon scorer.
    pub fn with_defaults() -> Result<Self> {
        Self::from_config(&SentinelConfig::default(), Arc::new(LexiconScorer::new()))
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Unrounded polarity of title + summary, clamped to `[-1, 1]`. A scorer
    /// failure falls back to neutral so one odd entry never aborts a scan.
    fn polarity(&self, entry: &RawEntry, text: &str) -> f64 {
        match self.scorer.polarity(text) {
            Ok(p) if p.is_finite() => p.clamp(-1.0, 1.0),
            Ok(p) => {
                self.note_fallback(entry, &format!("non-finite polarity {p}"));
                0.0
            }
            Err(e) => {
                self.note_fallback(entry, &format!("{e:#}"));
                0.0
            }
        }
    }

    fn note_fallback(&self, entry: &RawEntry, error: &str) {
        counter!("classify_fallback_total").increment(1);
        tracing::warn!(
            target: "classify",
            id = %crate::anon_hash(&entry.title),
            error,
            "sentiment scorer failed; using neutral polarity"
        );
    }

    pub fn classify(&self, entry: &RawEntry) -> ClassifiedItem {
        let summary = entry.summary_text();
        let text = if summary.is_empty() {
            entry.title.clone()
        } else {
            format!("{} {}", entry.title, summary)
        };

        // Thresholds see the raw score; only the stored value is rounded.
        let polarity = self.polarity(entry, &text);
        let sentiment = round2(polarity);
        let base = self.thresholds.level_for(polarity);
        let (risk, matched_phrase) = self.phrases.escalate(base, &entry.title);
        let category = self.taxonomy.categorize(&text);

        let id_src = if entry.link.trim().is_empty() {
            entry.title.as_str()
        } else {
            entry.link.as_str()
        };

        ClassifiedItem {
            id: crate::anon_hash(id_src),
            title: entry.title.clone(),
            link: entry.link.clone(),
            source: entry.source_name().to_string(),
            summary: summary.to_string(),
            published: entry.published_text().to_string(),
            date: normalize_published(entry.published.as_deref()),
            sentiment,
            risk,
            category,
            matched_phrase,
        }
    }

    pub fn classify_all(&self, entries: &[RawEntry]) -> Vec<ClassifiedItem> {
        entries.iter().map(|e| self.classify(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(f64);
    impl PolarityScorer for Fixed {
        fn polarity(&self, _text: &str) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct Broken;
    impl PolarityScorer for Broken {
        fn polarity(&self, _text: &str) -> Result<f64> {
            anyhow::bail!("scorer exploded")
        }
    }

    fn classifier(scorer: Arc<dyn PolarityScorer>) -> Classifier {
        Classifier::from_config(&SentinelConfig::default(), scorer).unwrap()
    }

    #[test]
    fn threshold_levels_follow_polarity() {
        let e = RawEntry::new("Ships wait outside the strait", "https://x/1");
        assert_eq!(classifier(Arc::new(Fixed(0.1))).classify(&e).risk, RiskLevel::Low);
        assert_eq!(classifier(Arc::new(Fixed(-0.1))).classify(&e).risk, RiskLevel::Medium);
        assert_eq!(classifier(Arc::new(Fixed(-0.5))).classify(&e).risk, RiskLevel::High);
    }

    #[test]
    fn keyword_override_beats_neutral_sentiment() {
        let e = RawEntry::new("Port blocked after minor incident", "https://x/2");
        let item = classifier(Arc::new(Fixed(0.0))).classify(&e);
        assert_eq!(item.risk, RiskLevel::Critical);
        assert_eq!(item.matched_phrase.as_deref(), Some("port blocked"));
    }

    #[test]
    fn scorer_failure_falls_back_to_neutral_low() {
        let e = RawEntry::new("Anything at all", "https://x/3");
        let item = classifier(Arc::new(Broken)).classify(&e);
        assert_eq!(item.sentiment, 0.0);
        assert_eq!(item.risk, RiskLevel::Low);
    }

    #[test]
    fn non_finite_polarity_is_neutralized() {
        let e = RawEntry::new("Anything at all", "https://x/4");
        let item = classifier(Arc::new(Fixed(f64::NAN))).classify(&e);
        assert_eq!(item.sentiment, 0.0);
    }

    #[test]
    fn sentiment_is_rounded_and_defaults_filled() {
        let e = RawEntry::new("Canal update", "https://x/5");
        let item = classifier(Arc::new(Fixed(-0.123_456))).classify(&e);
        assert_eq!(item.sentiment, -0.12);
        assert_eq!(item.published, "unknown");
        assert_eq!(item.date, None);
        assert_eq!(item.source, "Google News");
        assert_eq!(item.summary, "");
    }

    #[test]
    fn serializes_unknown_date_and_uppercase_risk() {
        let e = RawEntry::new("Canal update", "https://x/6");
        let v = serde_json::to_value(classifier(Arc::new(Fixed(0.0))).classify(&e)).unwrap();
        assert_eq!(v["date"], serde_json::json!("unknown"));
        assert_eq!(v["risk"], serde_json::json!("LOW"));
        assert!(v.get("matched_phrase").is_none());
    }

    #[test]
    fn category_does_not_change_level() {
        let e = RawEntry::new("New sanctions announced on shipping firms", "https://x/7");
        let item = classifier(Arc::new(Fixed(0.0))).classify(&e);
        assert_eq!(item.category, Category::Regulatory);
        assert_eq!(item.risk, RiskLevel::Low);
    }
}
