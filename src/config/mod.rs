// src/config/mod.rs
//! Runtime configuration: targets, noise terms, window presets, classifier tables.
//!
//! Lookup order:
//! 1) `$SENTINEL_CONFIG_PATH` (must exist)
//! 2) `config/sentinel.toml`
//! 3) built-in seed ([`SentinelConfig::default`])
//!
//! Missing keys in a file fall back to the seed. Threshold env overrides are
//! applied last, then the whole thing is validated once.

mod seed;

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::risk::Thresholds;
use crate::analyze::rules::CriticalPhrases;
use crate::analyze::taxonomy::{CategoryCfg, Taxonomy};
use crate::ingest::query::FetchSettings;
use crate::ingest::window::TimeWindow;
use crate::ingest::DedupPolicy;
use crate::view::ViewSettings;

pub const DEFAULT_CONFIG_PATH: &str = "config/sentinel.toml";
pub const ENV_CONFIG_PATH: &str = "SENTINEL_CONFIG_PATH";
pub const ENV_HIGH_THRESHOLD: &str = "SENTINEL_HIGH_THRESHOLD";
pub const ENV_MEDIUM_THRESHOLD: &str = "SENTINEL_MEDIUM_THRESHOLD";

/// A monitored choke point and its search expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetCfg {
    pub name: String,
    /// Free-text search expression (quoted phrases, `OR` disjunctions).
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named time-window preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowCfg {
    pub label: String,
    #[serde(flatten)]
    pub window: TimeWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentinelConfig {
    pub targets: Vec<TargetCfg>,
    pub excluded_terms: Vec<String>,
    pub windows: Vec<WindowCfg>,
    pub default_window: String,
    pub critical_phrases: Vec<String>,
    pub taxonomy: Vec<CategoryCfg>,
    pub thresholds: Thresholds,
    pub dedup: DedupPolicy,
    pub fetch: FetchSettings,
    pub view: ViewSettings,
}

impl SentinelConfig {
    /// Resolve the config path from env/fallbacks, load, override, validate.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
            }
            Self::read_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::read_file(Path::new(DEFAULT_CONFIG_PATH))?
        } else {
            tracing::info!(target: "config", "no config file found; using built-in seed");
            Self::default()
        };

        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load one explicit file (no env overrides), validated.
    pub fn load_from(path: &Path) -> Result<Self> {
        let cfg = Self::read_file(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sentinel config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing sentinel config {}", path.display()))
    }

    /// Parse TOML and tidy the term lists. Not validated.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: SentinelConfig = toml::from_str(s)?;
        cfg.excluded_terms = clean_list(std::mem::take(&mut cfg.excluded_terms));
        cfg.critical_phrases = clean_list(std::mem::take(&mut cfg.critical_phrases));
        Ok(cfg)
    }

    /// `SENTINEL_HIGH_THRESHOLD` / `SENTINEL_MEDIUM_THRESHOLD`; unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = parse_threshold_env(std::env::var(ENV_HIGH_THRESHOLD).ok()) {
            self.thresholds.high = v;
        }
        if let Some(v) = parse_threshold_env(std::env::var(ENV_MEDIUM_THRESHOLD).ok()) {
            self.thresholds.medium = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            bail!("at least one target must be configured");
        }
        let mut names = HashSet::new();
        for t in &self.targets {
            if t.name.trim().is_empty() || t.query.trim().is_empty() {
                bail!("target `{}` needs a name and a query", t.name);
            }
            if !names.insert(t.name.to_lowercase()) {
                bail!("duplicate target `{}`", t.name);
            }
        }

        // Any fixed date works; only the shape of the window is checked here.
        let probe = NaiveDate::from_ymd_opt(2000, 1, 1).ok_or_else(|| anyhow!("probe date"))?;
        for w in &self.windows {
            w.window
                .resolve(probe)
                .with_context(|| format!("window `{}`", w.label))?;
        }
        if self.window(&self.default_window).is_none() {
            bail!("default_window `{}` is not a configured window", self.default_window);
        }

        self.thresholds.validate()?;
        CriticalPhrases::compile(&self.critical_phrases)?;
        Taxonomy::compile(&self.taxonomy)?;

        if self.fetch.concurrency == 0 || self.fetch.timeout_secs == 0 {
            bail!("fetch.concurrency and fetch.timeout_secs must be positive");
        }
        self.view.validate()?;
        Ok(())
    }

    /// Case-insensitive target lookup.
    pub fn target(&self, name: &str) -> Option<&TargetCfg> {
        let n = name.trim();
        self.targets.iter().find(|t| t.name.eq_ignore_ascii_case(n))
    }

    /// Case-insensitive window preset lookup.
    pub fn window(&self, label: &str) -> Option<&WindowCfg> {
        let l = label.trim();
        self.windows.iter().find(|w| w.label.eq_ignore_ascii_case(l))
    }
}

// parse optional float env and clamp to <-1.0..=0.0>
fn parse_threshold_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(-1.0, 0.0))
}

/// Trim, drop empties and case-insensitive repeats; first spelling wins.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|it| it.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_valid() {
        SentinelConfig::default().validate().expect("seed validates");
    }

    #[test]
    fn partial_file_keeps_seed_for_missing_keys() {
        let cfg = SentinelConfig::from_toml_str(
            r#"
excluded_terms = [" Cricket ", "", "cricket", "Movie"]

[[targets]]
name = "Panama Canal"
query = '"Panama Canal" OR "Gatun Lake"'
"#,
        )
        .unwrap();
        assert_eq!(cfg.targets.len(), 1);
        assert_eq!(cfg.excluded_terms, vec!["Cricket".to_string(), "Movie".to_string()]);
        assert_eq!(cfg.windows, SentinelConfig::default().windows);
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_default_window_is_rejected() {
        let cfg = SentinelConfig {
            default_window: "Forever".into(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_phrase_regex_is_rejected() {
        let cfg = SentinelConfig {
            critical_phrases: vec!["re:[".into()],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn lookups_ignore_case() {
        let cfg = SentinelConfig::default();
        assert!(cfg.target("red sea / suez").is_some());
        assert!(cfg.window("past 1 month").is_some());
        assert!(cfg.target("Atlantis").is_none());
    }

    #[test]
    fn threshold_env_parsing_clamps() {
        assert_eq!(parse_threshold_env(Some(" -0.3 ".into())), Some(-0.3));
        assert_eq!(parse_threshold_env(Some("0.4".into())), Some(0.0));
        assert_eq!(parse_threshold_env(Some("-7".into())), Some(-1.0));
        assert_eq!(parse_threshold_env(Some("abc".into())), None);
        assert_eq!(parse_threshold_env(None), None);
    }
}
