use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, decimal_amount};

pub type RecordId = u64;

/// One expense entry. Records are only changed through `Ledger::edit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Assigned by the ledger, stable for the lifetime of the record
    pub id: RecordId,
    /// Amount in cents (always positive)
    #[serde(rename = "amount", with = "decimal_amount")]
    pub amount_cents: Cents,
    pub category: String,
    /// Day the money was spent
    pub date: NaiveDate,
    /// Free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Input for `Ledger::add`. The date defaults to today when omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub amount_cents: Cents,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl NewRecord {
    pub fn new(amount_cents: Cents, category: impl Into<String>) -> Self {
        Self {
            amount_cents,
            category: category.into(),
            date: None,
            description: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update for `Ledger::edit`. `None` leaves a field untouched.
/// An empty description clears the existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub amount_cents: Option<Cents>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl RecordUpdate {
    pub fn amount(mut self, amount_cents: Cents) -> Self {
        self.amount_cents = Some(amount_cents);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.amount_cents.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.description.is_none()
    }
}

/// Blank descriptions are stored as absent.
pub(crate) fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_record_json_layout() {
        let record = Record {
            id: 3,
            amount_cents: 1250,
            category: "Food".into(),
            date: date("2024-01-01"),
            description: None,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 3,
                "amount": 12.5,
                "category": "Food",
                "date": "2024-01-01"
            })
        );
    }

    #[test]
    fn test_record_reads_integer_amount_and_description() {
        let record: Record = serde_json::from_str(
            r#"{"id": 1, "amount": 7, "category": "Transport", "date": "2024-01-02", "description": "bus"}"#,
        )
        .unwrap();

        assert_eq!(record.amount_cents, 700);
        assert_eq!(record.description.as_deref(), Some("bus"));
    }

    #[test]
    fn test_record_rejects_bad_date() {
        let result: Result<Record, _> = serde_json::from_str(
            r#"{"id": 1, "amount": 7, "category": "Transport", "date": "2024-02-30"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_update_builder() {
        let update = RecordUpdate::default().amount(500).category("Food");
        assert_eq!(update.amount_cents, Some(500));
        assert_eq!(update.category.as_deref(), Some("Food"));
        assert!(update.date.is_none());
        assert!(!update.is_empty());
        assert!(RecordUpdate::default().is_empty());
    }

    #[test]
    fn test_clean_description() {
        assert_eq!(clean_description(Some("  lunch ".into())), Some("lunch".into()));
        assert_eq!(clean_description(Some("   ".into())), None);
        assert_eq!(clean_description(None), None);
    }
}
