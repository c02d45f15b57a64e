//! Critical-phrase override.
//!
//! Each configured phrase matches the title case-insensitively on word boundaries,
//! with any run of whitespace between its words:
//! - `"port blocked"`     matches "Port  blocked after incident", not "passport blocked"
//! - `"re:<regex>"`       is compiled verbatim (case-insensitive), for the odd
//!   pattern a phrase cannot express
//!
//! A match forces CRITICAL. The override only ever raises severity.

use anyhow::{anyhow, Result};
use regex::{Regex, RegexBuilder};

use super::risk::RiskLevel;

#[derive(Debug)]
struct CompiledPhrase {
    phrase: String,
    re: Regex,
}

#[derive(Debug, Default)]
pub struct CriticalPhrases {
    phrases: Vec<CompiledPhrase>,
}

impl CriticalPhrases {
    pub fn compile<S: AsRef<str>>(phrases: &[S]) -> Result<Self> {
        let phrases = phrases
            .iter()
            .map(AsRef::as_ref)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                let pattern = match p.strip_prefix("re:") {
                    Some(raw) => raw.to_string(),
                    None => phrase_pattern(p),
                };
                let re = RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| anyhow!("critical phrase `{p}` regex error: {e}"))?;
                Ok(CompiledPhrase {
                    phrase: p.to_string(),
                    re,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { phrases })
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// First configured phrase found in `title`.
    pub fn find(&self, title: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|p| p.re.is_match(title))
            .map(|p| p.phrase.as_str())
    }

    /// Apply the override to a sentiment-derived level.
    /// Returns the final level and the phrase that fired, if any.
    pub fn escalate(&self, base: RiskLevel, title: &str) -> (RiskLevel, Option<String>) {
        match self.find(title) {
            Some(p) => (RiskLevel::Critical.max(base), Some(p.to_string())),
            None => (base, None),
        }
    }
}

fn phrase_pattern(phrase: &str) -> String {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    format!(r"\b{}\b", words.join(r"\s+"))
}
