use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Time};

use crate::aggregator::{Contribution, MealId};

/// `YYYY-MM-DD`, shared by entry dates and daily rollup keys.
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, DATE_FORMAT);
time::serde::format_description!(clock_time, Time, "[hour]:[minute]");

/// Diary entries record what was eaten; planned entries record what is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Diary,
    Planned,
}

fn default_portions() -> f64 {
    1.0
}

/// What an entry consumed: loose ingredients, or portions of a stored meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntrySource {
    Ingredients {
        contributions: Vec<Contribution>,
    },
    Meal {
        meal_id: MealId,
        #[serde(default = "default_portions")]
        portions: f64,
    },
}

impl EntrySource {
    pub fn meal(meal_id: MealId) -> Self {
        EntrySource::Meal {
            meal_id,
            portions: default_portions(),
        }
    }
}

/// A dated diary or planner record. Never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub kind: EntryKind,
    #[serde(with = "iso_date")]
    pub date: Date,
    /// Orders entries within a day. Never used for bucketing.
    #[serde(default, with = "clock_time::option", skip_serializing_if = "Option::is_none")]
    pub time: Option<Time>,
    pub source: EntrySource,
}

impl Entry {
    pub fn new(date: Date, source: EntrySource) -> Self {
        Self {
            id: None,
            kind: EntryKind::Diary,
            date,
            time: None,
            source,
        }
    }

    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn at(mut self, time: Time) -> Self {
        self.time = Some(time);
        self
    }

    /// Chronological order: date first, then time of day. Untimed entries sort
    /// before timed ones on the same day.
    pub fn chronological_cmp(&self, other: &Entry) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.time.cmp(&other.time))
    }
}
