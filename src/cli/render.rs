use std::io::{self, Write};

use crate::application::{CategoryDetail, PeriodReport, SpendingSummary};
use crate::domain::{Record, format_cents};

pub fn write_records(out: &mut dyn Write, records: &[Record]) -> io::Result<()> {
    if records.is_empty() {
        return writeln!(out, "No expenses recorded yet.");
    }

    writeln!(
        out,
        "{:<5} {:<12} {:<15} {:>10}  {:<20}",
        "ID", "DATE", "CATEGORY", "AMOUNT", "DESCRIPTION"
    )?;
    writeln!(out, "{}", "-".repeat(66))?;
    for record in records {
        writeln!(
            out,
            "{:<5} {:<12} {:<15} {:>10}  {:<20}",
            record.id,
            record.date.format("%Y-%m-%d"),
            truncate(&record.category, 15),
            format_cents(record.amount_cents),
            truncate(record.description.as_deref().unwrap_or(""), 20)
        )?;
    }
    Ok(())
}

pub fn write_record(out: &mut dyn Write, record: &Record) -> io::Result<()> {
    write!(
        out,
        "#{} {} {} on {}",
        record.id,
        format_cents(record.amount_cents),
        record.category,
        record.date.format("%Y-%m-%d")
    )?;
    if let Some(desc) = &record.description {
        write!(out, " ({})", desc)?;
    }
    writeln!(out)
}

pub fn write_summary(out: &mut dyn Write, summary: &SpendingSummary) -> io::Result<()> {
    if summary.record_count == 0 {
        return writeln!(out, "No expenses to summarize.");
    }

    writeln!(out, "Spending Summary (as of {})", summary.as_of.format("%Y-%m-%d"))?;
    writeln!(out, "Total: {} across {} expenses", format_cents(summary.total), summary.record_count)?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<20} {:>12} {:>8} {:>12} {:>8}",
        "CATEGORY", "TOTAL", "COUNT", "AVERAGE", "PERCENT"
    )?;
    writeln!(out, "{}", "-".repeat(65))?;
    for cat in &summary.categories {
        writeln!(
            out,
            "{:<20} {:>12} {:>8} {:>12} {:>7.1}%",
            truncate(&cat.category, 20),
            format_cents(cat.total),
            cat.count,
            format_cents(cat.average),
            cat.percentage
        )?;
    }
    writeln!(out, "{}", "-".repeat(65))?;
    writeln!(out)?;
    writeln!(
        out,
        "Last {} days ({} to {}): {}",
        summary.recent.days,
        summary.recent.from.format("%Y-%m-%d"),
        summary.recent.to.format("%Y-%m-%d"),
        format_cents(summary.recent.total)
    )?;
    writeln!(out, "Average daily spending: {}", format_cents(summary.recent.daily_average))
}

pub fn write_category_detail(out: &mut dyn Write, detail: &CategoryDetail) -> io::Result<()> {
    writeln!(out, "{} Summary", detail.category)?;
    writeln!(out, "  Expenses:     {}", detail.count)?;
    writeln!(out, "  Total:        {}", format_cents(detail.total))?;
    writeln!(out, "  Average:      {}", format_cents(detail.average))?;
    writeln!(out)?;
    writeln!(out, "Most recent:")?;
    for record in &detail.recent {
        writeln!(
            out,
            "  {}: {} - {}",
            record.date.format("%Y-%m-%d"),
            format_cents(record.amount_cents),
            record.description.as_deref().unwrap_or("No description")
        )?;
    }
    Ok(())
}

pub fn write_period_report(out: &mut dyn Write, report: &PeriodReport) -> io::Result<()> {
    if report.periods.is_empty() {
        return writeln!(out, "No expenses recorded yet.");
    }

    writeln!(out, "Spending per {}", report.granularity)?;
    writeln!(out)?;
    writeln!(out, "{:<12} {:<12} {:<12} {:>12}", "PERIOD", "FROM", "TO", "TOTAL")?;
    writeln!(out, "{}", "-".repeat(51))?;
    for period in &report.periods {
        // Shown inclusive
        let last_day = period.period_end.pred_opt().unwrap_or(period.period_end);
        writeln!(
            out,
            "{:<12} {:<12} {:<12} {:>12}",
            period.label,
            period.period_start.format("%Y-%m-%d"),
            last_day.format("%Y-%m-%d"),
            format_cents(period.total)
        )?;
    }
    writeln!(out, "{}", "-".repeat(51))?;
    writeln!(out, "{:<38} {:>12}", "TOTAL", format_cents(report.total))
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Food", 10), "Food");
        assert_eq!(truncate("Entertainment", 8), "Enter...");
    }
}
