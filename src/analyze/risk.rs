//! Risk buckets and the polarity → bucket thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse severity bucket, ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" | "STABLE" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            "CRITICAL" => Ok(RiskLevel::Critical),
            other => anyhow::bail!("unknown risk level `{other}`"),
        }
    }
}

/// Polarity cutoffs. Strictly-below comparisons: `p < high` → HIGH,
/// else `p < medium` → MEDIUM, else LOW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: -0.2,
            medium: -0.05,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.high.is_finite() || !self.medium.is_finite() {
            anyhow::bail!("thresholds must be finite");
        }
        if self.high > self.medium {
            anyhow::bail!(
                "high threshold ({}) must not exceed medium threshold ({})",
                self.high,
                self.medium
            );
        }
        Ok(())
    }

    /// Sentiment-derived level; CRITICAL is never produced here.
    pub fn level_for(&self, polarity: f64) -> RiskLevel {
        if polarity < self.high {
            RiskLevel::High
        } else if polarity < self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_totally_ordered_by_severity() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn default_threshold_boundaries() {
        let t = Thresholds::default();
        assert_eq!(t.level_for(0.3), RiskLevel::Low);
        assert_eq!(t.level_for(-0.05), RiskLevel::Low);
        assert_eq!(t.level_for(-0.06), RiskLevel::Medium);
        assert_eq!(t.level_for(-0.2), RiskLevel::Medium);
        assert_eq!(t.level_for(-0.21), RiskLevel::High);
        assert_eq!(t.level_for(-1.0), RiskLevel::High);
    }

    #[test]
    fn tunable_high_cutoff() {
        let t = Thresholds {
            high: -0.3,
            medium: -0.05,
        };
        assert_eq!(t.level_for(-0.25), RiskLevel::Medium);
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let t = Thresholds {
            high: 0.0,
            medium: -0.5,
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn parse_and_serialize_uppercase() {
        assert_eq!("critical".parse::<RiskLevel>().unwrap(), RiskLevel::Critical);
        assert_eq!(
            serde_json::to_string(&RiskLevel::Medium).unwrap(),
            "\"MEDIUM\""
        );
        assert!("severe".parse::<RiskLevel>().is_err());
    }
}
