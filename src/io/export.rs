use anyhow::Result;
use std::io::Write;

use crate::application::ExpenseService;
use crate::domain::{SortOrder, Snapshot, format_cents};

/// Exporter for writing expenses to portable formats
pub struct Exporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Export expenses to CSV, in insertion order
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let records = self.service.list_expenses(SortOrder::Insertion);
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "date", "category", "amount", "description"])?;

        for record in &records {
            csv_writer.write_record([
                record.id.to_string(),
                record.date.format("%Y-%m-%d").to_string(),
                record.category.clone(),
                format_cents(record.amount_cents),
                record.description.clone().unwrap_or_default(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(records.len())
    }

    /// Export expenses as a JSON array in the data file layout
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<Snapshot> {
        let snapshot = self.service.ledger().to_snapshot();
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::TempDir;

    use super::*;
    use crate::config::SaveMode;
    use crate::domain::{Clock, Ledger, LedgerPolicy, NewRecord};
    use crate::storage::JsonStore;

    fn service(dir: &TempDir) -> ExpenseService {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let mut ledger = Ledger::with_policy(LedgerPolicy {
            clock: Clock::Fixed(today),
            ..LedgerPolicy::default()
        });
        ledger
            .add(NewRecord::new(1250, "Food").with_description("lunch, with tip"))
            .unwrap();
        ledger.add(NewRecord::new(700, "Transport")).unwrap();
        ExpenseService::new(ledger, JsonStore::new(dir.path().join("e.json")), SaveMode::OnExit)
    }

    #[test]
    fn test_export_csv() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let mut out = Vec::new();

        let count = Exporter::new(&service).export_csv(&mut out).unwrap();

        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,date,category,amount,description");
        assert_eq!(lines[1], "1,2024-01-10,Food,12.50,\"lunch, with tip\"");
        assert_eq!(lines[2], "2,2024-01-10,Transport,7.00,");
    }

    #[test]
    fn test_export_json_matches_data_layout() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);
        let mut out = Vec::new();

        let snapshot = Exporter::new(&service).export_json(&mut out).unwrap();

        let parsed: Snapshot = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed.len(), 2);
    }
}
