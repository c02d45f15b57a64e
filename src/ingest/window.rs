//! Time windows and time slicing.
//!
//! A [`TimeWindow`] is what the user asks for ("last 7 days", "past month"); it
//! resolves into one or more [`FetchWindow`]s, each of which becomes exactly one
//! request to the feed source. Sliced windows split a day span into contiguous,
//! non-overlapping [`DateSlice`]s to stay under the source's per-request ceiling.

use anyhow::{anyhow, bail, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeUnit {
    Hours,
    Days,
}

/// Relative age such as `1h` or `7d`. The source only understands hours and days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativeAge {
    pub amount: u32,
    pub unit: AgeUnit,
}

impl RelativeAge {
    pub fn hours(amount: u32) -> Self {
        Self {
            amount,
            unit: AgeUnit::Hours,
        }
    }

    pub fn days(amount: u32) -> Self {
        Self {
            amount,
            unit: AgeUnit::Days,
        }
    }
}

impl fmt::Display for RelativeAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = match self.unit {
            AgeUnit::Hours => 'h',
            AgeUnit::Days => 'd',
        };
        write!(f, "{}{}", self.amount, u)
    }
}

impl FromStr for RelativeAge {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        let (num, unit) = match s.chars().last() {
            Some('h') => (&s[..s.len() - 1], AgeUnit::Hours),
            Some('d') => (&s[..s.len() - 1], AgeUnit::Days),
            _ => bail!("relative age `{s}` must end with `h` or `d`"),
        };
        let amount: u32 = num
            .parse()
            .map_err(|e| anyhow!("relative age `{s}`: {e}"))?;
        if amount == 0 {
            bail!("relative age `{s}` must be positive");
        }
        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for RelativeAge {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RelativeAge> for String {
    fn from(a: RelativeAge) -> String {
        a.to_string()
    }
}

/// Half-open date range: `after` is the first covered day, `before` is the first
/// day no longer covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSlice {
    pub after: NaiveDate,
    pub before: NaiveDate,
}

impl DateSlice {
    pub fn new(after: NaiveDate, before: NaiveDate) -> Result<Self> {
        if after >= before {
            bail!("date range {after}..{before} is empty");
        }
        Ok(Self { after, before })
    }

    /// Number of covered days.
    pub fn len_days(&self) -> i64 {
        (self.before - self.after).num_days()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.after <= day && day < self.before
    }
}

/// One concrete request's time modifier. Never both kinds at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchWindow {
    Relative { age: RelativeAge },
    Range { slice: DateSlice },
}

/// Window as requested by the user or configured as a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeWindow {
    /// Single request with a relative-age token.
    Relative { age: RelativeAge },
    /// Single request with an explicit date range.
    Range { after: NaiveDate, before: NaiveDate },
    /// The last `days` days (today included) split into `slices` date ranges.
    Sliced { days: u32, slices: u32 },
}

impl TimeWindow {
    /// Resolve into concrete fetch requests relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<Vec<FetchWindow>> {
        match *self {
            TimeWindow::Relative { age } => {
                if age.amount == 0 {
                    bail!("relative window must be positive");
                }
                Ok(vec![FetchWindow::Relative { age }])
            }
            TimeWindow::Range { after, before } => Ok(vec![FetchWindow::Range {
                slice: DateSlice::new(after, before)?,
            }]),
            TimeWindow::Sliced { days, slices } => Ok(slice_days(today, days, slices)?
                .into_iter()
                .map(|slice| FetchWindow::Range { slice })
                .collect()),
        }
    }
}

/// Split the last `days` days ending with `today` into at most `slices`
/// contiguous ranges, newest first.
///
/// Boundaries are day offsets subtracted from the exclusive end (`today + 1`), so
/// adjacent slices share a boundary date that is `before` of the older slice and
/// `after` of the newer one. A slice count above `days` is capped to one day per
/// slice.
pub fn slice_days(today: NaiveDate, days: u32, slices: u32) -> Result<Vec<DateSlice>> {
    if days == 0 || slices == 0 {
        bail!("sliced window needs positive days and slices (got {days}/{slices})");
    }
    let k = u64::from(slices.min(days));
    let n = u64::from(days);
    let end = today
        .checked_add_days(Days::new(1))
        .ok_or_else(|| anyhow!("date overflow after {today}"))?;

    let offset = |i: u64| -> Result<NaiveDate> {
        end.checked_sub_days(Days::new(i * n / k))
            .ok_or_else(|| anyhow!("date underflow slicing {days} days"))
    };

    let mut out = Vec::with_capacity(k as usize);
    for i in 0..k {
        out.push(DateSlice::new(offset(i + 1)?, offset(i)?)?);
    }
    Ok(out)
}
