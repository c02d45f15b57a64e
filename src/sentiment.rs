//! # Sentiment
//! Polarity scoring for headline text.
//!
//! The classifier only needs "text in, real-valued polarity out", so scoring sits
//! behind [`PolarityScorer`]. The bundled [`LexiconScorer`] averages word scores
//! from `sentiment_lexicon.json` (integer weights in `-5..=5`) over the words that
//! carry sentiment, which yields a polarity in `[-1.0, 1.0]`.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

/// Largest absolute weight in the lexicon; used to normalize into `[-1, 1]`.
const MAX_WORD_WEIGHT: f64 = 5.0;

/// Anything that maps text to a polarity score (negative = unfavorable tone).
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> Result<f64>;
}

#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon weight for a single lower-cased word (0 when unknown).
    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Returns (sum of weights, number of sentiment-bearing words).
    /// A negator in the previous 1..=3 tokens flips the sign of a word's weight.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut score: i32 = 0;
        let mut hits = 0usize;

        for i in 0..tokens.len() {
            let base = self.word_score(tokens[i].as_str());
            if base == 0 {
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            score += if negated { -base } else { base };
            hits += 1;
        }

        (score, hits)
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> Result<f64> {
        if text.contains('\0') {
            bail!("text contains NUL bytes");
        }
        let (score, hits) = self.score_text(text);
        if hits == 0 {
            return Ok(0.0);
        }
        let p = f64::from(score) / (hits as f64 * MAX_WORD_WEIGHT);
        Ok(p.clamp(-1.0, 1.0))
    }
}

/// Round to two decimals for display/storage. Negative zero comes back as `0.0`.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0 + 0.0
}

/// Alphanumeric tokens (apostrophes kept so "isn't" survives), lower-cased.
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "without"
    )
}
