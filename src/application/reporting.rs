use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::aggregate::{self, GroupStats};
use crate::domain::{Cents, Granularity, Record};

/// Number of records listed in a category detail view.
pub const CATEGORY_DETAIL_RECENT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub as_of: NaiveDate,
    pub total: Cents,
    pub record_count: usize,
    /// Sorted by total, largest first
    pub categories: Vec<CategorySummary>,
    pub recent: RecentWindow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: usize,
    pub average: Cents,
    pub percentage: f64,
}

/// Spending over the trailing `days` days up to and including `to`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: u32,
    pub total: Cents,
    pub daily_average: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDetail {
    pub category: String,
    pub count: usize,
    pub total: Cents,
    pub average: Cents,
    /// Newest first
    pub recent: Vec<Record>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReport {
    pub granularity: Granularity,
    pub periods: Vec<PeriodTotal>,
    pub total: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodTotal {
    pub label: String,
    pub period_start: NaiveDate,
    /// Exclusive
    pub period_end: NaiveDate,
    pub total: Cents,
}

impl SpendingSummary {
    pub fn build(records: &[Record], today: NaiveDate, recent_days: u32) -> Self {
        let total = aggregate::total(records);

        let mut categories: Vec<CategorySummary> = aggregate::category_stats(records)
            .into_iter()
            .map(|(category, stats)| CategorySummary {
                percentage: percentage(stats.total, total),
                average: stats.average(),
                total: stats.total,
                count: stats.count,
                category,
            })
            .collect();
        categories.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));

        Self {
            as_of: today,
            total,
            record_count: records.len(),
            categories,
            recent: RecentWindow::build(records, today, recent_days),
        }
    }
}

impl RecentWindow {
    pub fn build(records: &[Record], today: NaiveDate, days: u32) -> Self {
        let from = today
            .checked_sub_days(Days::new(days as u64))
            .unwrap_or(NaiveDate::MIN);
        let total = aggregate::total(&aggregate::within(records, from, today));
        let daily_average = if days == 0 {
            0
        } else {
            GroupStats {
                count: days as usize,
                total,
            }
            .average()
        };

        Self {
            from,
            to: today,
            days,
            total,
            daily_average,
        }
    }
}

impl CategoryDetail {
    /// `None` when no record carries the category. The match ignores case.
    pub fn build(records: &[Record], category: &str) -> Option<Self> {
        let wanted = category.trim();
        let mut matching: Vec<Record> = records
            .iter()
            .filter(|r| r.category.eq_ignore_ascii_case(wanted))
            .cloned()
            .collect();
        let first = matching.first()?;
        let name = first.category.clone();

        let stats = matching.iter().fold(GroupStats::default(), |mut stats, r| {
            stats.push(r.amount_cents);
            stats
        });

        matching.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        matching.truncate(CATEGORY_DETAIL_RECENT);

        Some(Self {
            category: name,
            count: stats.count,
            total: stats.total,
            average: stats.average(),
            recent: matching,
        })
    }
}

impl PeriodReport {
    pub fn build(records: &[Record], granularity: Granularity) -> Self {
        let periods: Vec<PeriodTotal> = aggregate::by_period(records, granularity)
            .into_iter()
            .map(|(start, total)| PeriodTotal {
                label: granularity.label(start),
                period_start: start,
                period_end: granularity.period_end(start),
                total,
            })
            .collect();

        Self {
            granularity,
            total: aggregate::total(records),
            periods,
        }
    }
}

fn percentage(part: Cents, whole: Cents) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}
