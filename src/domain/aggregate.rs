//! Pure aggregation over a slice of records.
//!
//! Results depend only on each record's grouping key and amount, never on the
//! order of the input, and the input is never modified.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Cents, Record};

/// Time bucket size for period aggregation. Weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// First day of the period containing `date`.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                let offset = date.weekday().num_days_from_monday();
                date - Days::new(offset as u64)
            }
            // Day 1 exists in every month
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// First day after the period starting at `start` (exclusive end).
    pub fn period_end(&self, start: NaiveDate) -> NaiveDate {
        let next = match self {
            Granularity::Day => start.checked_add_days(Days::new(1)),
            Granularity::Week => start.checked_add_days(Days::new(7)),
            Granularity::Month => start.checked_add_months(Months::new(1)),
        };
        next.unwrap_or(NaiveDate::MAX)
    }

    /// Human-readable key for the period starting at `start`:
    /// `2024-01-05`, `2024-W01` or `2024-01`.
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            Granularity::Day => start.format("%Y-%m-%d").to_string(),
            Granularity::Week => {
                let week = start.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Granularity::Month => start.format("%Y-%m").to_string(),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(format!("unknown granularity '{}'", other)),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Count and sum for one group of records.
///
/// Sums saturate at `Cents::MAX` instead of wrapping. With amounts capped at
/// `MAX_AMOUNT_CENTS` that takes tens of millions of maximal records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub count: usize,
    pub total: Cents,
}

impl GroupStats {
    pub fn push(&mut self, amount: Cents) {
        self.count += 1;
        self.total = self.total.saturating_add(amount);
    }

    /// Integer average, rounded half away from zero.
    pub fn average(&self) -> Cents {
        if self.count == 0 {
            return 0;
        }
        let count = self.count as i128;
        let average = (self.total as i128 * 2 + count).div_euclid(count * 2);
        // |average| never exceeds |total|
        average as Cents
    }
}

/// Sum of all amounts; 0 for no records.
pub fn total(records: &[Record]) -> Cents {
    records
        .iter()
        .fold(0, |sum: Cents, r| sum.saturating_add(r.amount_cents))
}

/// Sum per category. Only categories that occur in `records` appear.
pub fn by_category(records: &[Record]) -> BTreeMap<String, Cents> {
    let mut totals = BTreeMap::new();
    for record in records {
        let sum: &mut Cents = totals.entry(record.category.clone()).or_insert(0);
        *sum = sum.saturating_add(record.amount_cents);
    }
    totals
}

/// Count and sum per category.
pub fn category_stats(records: &[Record]) -> BTreeMap<String, GroupStats> {
    let mut stats: BTreeMap<String, GroupStats> = BTreeMap::new();
    for record in records {
        stats
            .entry(record.category.clone())
            .or_default()
            .push(record.amount_cents);
    }
    stats
}

/// Sum per period, keyed by period start and ordered ascending.
pub fn by_period(records: &[Record], granularity: Granularity) -> BTreeMap<NaiveDate, Cents> {
    let mut totals = BTreeMap::new();
    for record in records {
        let key = granularity.period_start(record.date);
        let sum: &mut Cents = totals.entry(key).or_insert(0);
        *sum = sum.saturating_add(record.amount_cents);
    }
    totals
}

/// Records dated within `[from, to]`, both ends inclusive.
pub fn within(records: &[Record], from: NaiveDate, to: NaiveDate) -> Vec<Record> {
    records
        .iter()
        .filter(|r| r.date >= from && r.date <= to)
        .cloned()
        .collect()
}
