use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration};

use crate::aggregator::{Aggregator, NutrientSource};
use crate::entry::{Entry, EntryKind, DATE_FORMAT};
use crate::error::{NutritionError, Result};
use crate::nutrients::NutrientVector;

const WEEK_KEY_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year base:iso_week]-W[week_number repr:iso]");
const MONTH_KEY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]");

/// Calendar window used to group dated entries. Weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Bucketing {
    #[default]
    Day,
    Week,
    Month,
}

impl Bucketing {
    /// First day of the bucket containing `date`.
    pub fn bucket_start(self, date: Date) -> Date {
        match self {
            Bucketing::Day => date,
            Bucketing::Week => {
                date - Duration::days(i64::from(date.weekday().number_days_from_monday()))
            }
            Bucketing::Month => date - Duration::days(i64::from(date.day()) - 1),
        }
    }

    /// Display key for the bucket starting at `start`: `2024-01-31`, `2024-W05`
    /// (ISO week-numbering year) or `2024-01`.
    pub fn bucket_key(self, start: Date) -> Result<String> {
        let format = match self {
            Bucketing::Day => DATE_FORMAT,
            Bucketing::Week => WEEK_KEY_FORMAT,
            Bucketing::Month => MONTH_KEY_FORMAT,
        };
        start.format(format).map_err(|e| NutritionError::BucketKey {
            start,
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for Bucketing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Bucketing::Day => "day",
            Bucketing::Week => "week",
            Bucketing::Month => "month",
        };
        f.write_str(s)
    }
}

impl FromStr for Bucketing {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Bucketing::Day),
            "week" => Ok(Bucketing::Week),
            "month" => Ok(Bucketing::Month),
            other => Err(format!("unknown bucketing '{other}', expected day, week or month")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupBucket {
    pub bucket_key: String,
    #[serde(skip)]
    pub start: Date,
    pub total: NutrientVector,
    pub entry_count: usize,
    /// Distinct dates that have at least one entry in this bucket.
    pub day_count: usize,
}

impl RollupBucket {
    /// Bucket total spread evenly over the days that have entries.
    pub fn daily_average(&self) -> NutrientVector {
        if self.day_count <= 1 {
            self.total.clone()
        } else {
            self.total.scale(1.0 / self.day_count as f64)
        }
    }
}

/// Materialized rollup: non-empty buckets in ascending chronological order.
///
/// Iterating does not consume it, so it can be walked any number of times.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Rollup {
    buckets: Vec<RollupBucket>,
}

impl Rollup {
    pub fn iter(&self) -> std::slice::Iter<'_, RollupBucket> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, bucket_key: &str) -> Option<&RollupBucket> {
        self.buckets.iter().find(|b| b.bucket_key == bucket_key)
    }

    pub fn into_buckets(self) -> Vec<RollupBucket> {
        self.buckets
    }
}

impl<'a> IntoIterator for &'a Rollup {
    type Item = &'a RollupBucket;
    type IntoIter = std::slice::Iter<'a, RollupBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}

impl IntoIterator for Rollup {
    type Item = RollupBucket;
    type IntoIter = std::vec::IntoIter<RollupBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

/// Groups entries into calendar buckets and aggregates each bucket.
///
/// Fails on the first entry that cannot be aggregated; no buckets are
/// returned in that case.
pub fn rollup<S: NutrientSource + ?Sized>(
    source: &S,
    entries: &[Entry],
    bucketing: Bucketing,
) -> Result<Rollup> {
    rollup_filtered(source, entries.iter(), bucketing)
}

/// Like [`rollup`], restricted to entries of one kind.
pub fn rollup_kind<S: NutrientSource + ?Sized>(
    source: &S,
    entries: &[Entry],
    bucketing: Bucketing,
    kind: EntryKind,
) -> Result<Rollup> {
    rollup_filtered(source, entries.iter().filter(|e| e.kind == kind), bucketing)
}

fn rollup_filtered<'e, S, I>(source: &S, entries: I, bucketing: Bucketing) -> Result<Rollup>
where
    S: NutrientSource + ?Sized,
    I: Iterator<Item = &'e Entry>,
{
    let mut grouped: BTreeMap<Date, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        grouped
            .entry(bucketing.bucket_start(entry.date))
            .or_default()
            .push(entry);
    }

    let aggregator = Aggregator::new(source);
    let mut buckets = Vec::with_capacity(grouped.len());
    for (start, mut members) in grouped {
        members.sort_by(|a, b| a.chronological_cmp(b));
        let total = aggregator.entries(members.iter().copied())?;
        let day_count = members.iter().map(|e| e.date).collect::<BTreeSet<_>>().len();
        buckets.push(RollupBucket {
            bucket_key: bucketing.bucket_key(start)?,
            start,
            total,
            entry_count: members.len(),
            day_count,
        });
    }

    tracing::debug!(%bucketing, buckets = buckets.len(), "built rollup");
    Ok(Rollup { buckets })
}
