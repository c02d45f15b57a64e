// src/analyze/taxonomy.rs
//! Root-cause categories. Informational only: the category never changes the risk level.

use anyhow::{anyhow, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Conflict,
    Logistics,
    Regulatory,
    NaturalDisaster,
    Unclassified,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Conflict => "Conflict",
            Category::Logistics => "Logistics/Supply-Chain-Delay",
            Category::Regulatory => "Regulatory/Sanction",
            Category::NaturalDisaster => "Natural-Disaster",
            Category::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the category table as configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCfg {
    pub category: Category,
    pub patterns: Vec<String>,
}

/// Compiled, ordered category table; the first category with a hit wins.
#[derive(Debug, Default)]
pub struct Taxonomy {
    rows: Vec<(Category, Vec<Regex>)>,
}

impl Taxonomy {
    pub fn compile(cfg: &[CategoryCfg]) -> Result<Self> {
        let rows = cfg
            .iter()
            .map(|row| {
                let res = row
                    .patterns
                    .iter()
                    .map(|p| {
                        RegexBuilder::new(p)
                            .case_insensitive(true)
                            .build()
                            .map_err(|e| anyhow!("taxonomy `{}` regex error: {}", row.category, e))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok((row.category, res))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn categorize(&self, text: &str) -> Category {
        self.rows
            .iter()
            .find(|(_, res)| res.iter().any(|re| re.is_match(text)))
            .map(|(c, _)| *c)
            .unwrap_or(Category::Unclassified)
    }
}

/// Built-in table used when the configuration does not provide one.
pub fn default_taxonomy() -> Vec<CategoryCfg> {
    fn row(category: Category, patterns: &[&str]) -> CategoryCfg {
        CategoryCfg {
            category,
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        }
    }
    vec![
        row(
            Category::Conflict,
            &[
                r"\b(attack|attacks|attacked|missile|missiles|drone|drones)\b",
                r"\b(military|navy|naval|warship|war|clash|clashes|hostilities)\b",
                r"\b(seiz(e|ed|ure)|hijack(ed)?|piracy|pirates|houthi)\b",
            ],
        ),
        row(
            Category::Logistics,
            &[
                r"\b(delay|delays|delayed|congestion|backlog|bottleneck)\b",
                r"\b(reroute[ds]?|rerouting|diver(t|ted|sion)|detour)\b",
                r"\b(freight rates?|container shortage|shipping disruption)\b",
            ],
        ),
        row(
            Category::Regulatory,
            &[
                r"\b(sanction(s|ed)?|embargo|tariffs?|export (ban|controls?))\b",
                r"\b(ban|bans|banned|blacklist(ed)?|regulator|regulation)\b",
            ],
        ),
        row(
            Category::NaturalDisaster,
            &[
                r"\b(typhoon|cyclone|hurricane|earthquake|tsunami)\b",
                r"\b(flood|floods|flooding|storm|drought|landslide)\b",
            ],
        ),
    ]
}
