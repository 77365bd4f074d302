use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::record::clean_description;
use super::{
    CategoryPolicy, Cents, Field, FieldIssue, LedgerError, NewRecord, Record, RecordId,
    MAX_AMOUNT_CENTS, RecordUpdate, SnapshotIssue, ValidationError, format_cents,
};

/// Source of "today" for date defaults and the future-date check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// The local calendar date of the machine.
    #[default]
    System,
    /// A pinned date, for tests and replays.
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::System => Local::now().date_naive(),
            Clock::Fixed(date) => *date,
        }
    }
}

/// Rules every record in a ledger must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerPolicy {
    pub allow_future_dates: bool,
    pub categories: CategoryPolicy,
    pub clock: Clock,
}

impl LedgerPolicy {
    /// Check all fields at once so the caller sees every problem, and return
    /// the normalized category.
    fn check(&self, amount_cents: Cents, category: &str, date: NaiveDate) -> Result<String, ValidationError> {
        let mut issues = Vec::new();

        if amount_cents <= 0 {
            issues.push(FieldIssue::new(
                Field::Amount,
                format!("amount must be positive, got {}", format_cents(amount_cents)),
            ));
        } else if amount_cents > MAX_AMOUNT_CENTS {
            issues.push(FieldIssue::new(
                Field::Amount,
                format!(
                    "amount must be at most {}, got {}",
                    format_cents(MAX_AMOUNT_CENTS),
                    format_cents(amount_cents)
                ),
            ));
        }

        let category = match self.categories.normalize(category) {
            Ok(category) => Some(category),
            Err(err) => {
                issues.extend(err.issues);
                None
            }
        };

        if !self.allow_future_dates {
            let today = self.clock.today();
            if date > today {
                issues.push(FieldIssue::new(
                    Field::Date,
                    format!("date {} is in the future (today is {})", date, today),
                ));
            }
        }

        match category {
            Some(category) if issues.is_empty() => Ok(category),
            _ => Err(ValidationError { issues }),
        }
    }
}

/// Ordering for `Ledger::list_sorted`. Ties keep insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Insertion,
    Date,
    Amount,
    Category,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Insertion => "insertion",
            SortOrder::Date => "date",
            SortOrder::Amount => "amount",
            SortOrder::Category => "category",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "insertion" | "id" => Ok(SortOrder::Insertion),
            "date" => Ok(SortOrder::Date),
            "amount" => Ok(SortOrder::Amount),
            "category" => Ok(SortOrder::Category),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable, ordered export of a ledger's records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// In-memory collection of expense records, in insertion order.
///
/// Every stored record satisfies the ledger's policy: mutations validate
/// before they touch the collection, so a failed call leaves it unchanged.
#[derive(Debug, Clone)]
pub struct Ledger {
    records: Vec<Record>,
    next_id: RecordId,
    policy: LedgerPolicy,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_policy(LedgerPolicy::default())
    }

    pub fn with_policy(policy: LedgerPolicy) -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            policy,
        }
    }

    pub fn policy(&self) -> &LedgerPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn today(&self) -> NaiveDate {
        self.policy.clock.today()
    }

    /// Validate and append a new record, returning the stored copy.
    pub fn add(&mut self, new: NewRecord) -> Result<&Record, LedgerError> {
        let date = new.date.unwrap_or_else(|| self.today());
        let category = self.policy.check(new.amount_cents, &new.category, date)?;
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| ValidationError::single(Field::Id, "no record ids left"))?;

        let record = Record {
            id: self.next_id,
            amount_cents: new.amount_cents,
            category,
            date,
            description: clean_description(new.description),
        };
        self.next_id = next_id;
        self.records.push(record);

        let index = self.records.len() - 1;
        Ok(&self.records[index])
    }

    pub fn get(&self, id: RecordId) -> Result<&Record, LedgerError> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))
    }

    /// Apply the provided fields to an existing record. The merged record is
    /// validated as a whole before anything is written.
    pub fn edit(&mut self, id: RecordId, update: RecordUpdate) -> Result<&Record, LedgerError> {
        let index = self.position(id)?;
        let current = &self.records[index];

        let amount_cents = update.amount_cents.unwrap_or(current.amount_cents);
        let category = update.category.as_deref().unwrap_or(&current.category);
        let date = update.date.unwrap_or(current.date);
        let category = self.policy.check(amount_cents, category, date)?;
        let description = match update.description {
            Some(description) => clean_description(Some(description)),
            None => current.description.clone(),
        };

        let record = &mut self.records[index];
        record.amount_cents = amount_cents;
        record.category = category;
        record.date = date;
        record.description = description;
        Ok(record)
    }

    /// Remove a record and hand it back to the caller.
    pub fn delete(&mut self, id: RecordId) -> Result<Record, LedgerError> {
        let index = self.position(id)?;
        Ok(self.records.remove(index))
    }

    /// Read-only view in insertion order.
    pub fn list(&self) -> &[Record] {
        &self.records
    }

    /// Copy of the records in the requested order.
    pub fn list_sorted(&self, order: SortOrder) -> Vec<Record> {
        let mut records = self.records.clone();
        match order {
            SortOrder::Insertion => {}
            SortOrder::Date => records.sort_by_key(|r| r.date),
            SortOrder::Amount => records.sort_by_key(|r| r.amount_cents),
            SortOrder::Category => records.sort_by(|a, b| a.category.cmp(&b.category)),
        }
        records
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::new(self.records.clone())
    }

    /// Replace the contents with a snapshot. Every entry is checked; if any is
    /// invalid nothing is loaded and all offending entries are reported.
    pub fn load_from(&mut self, snapshot: Snapshot) -> Result<(), LedgerError> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(snapshot.records.len());

        for (index, mut record) in snapshot.records.into_iter().enumerate() {
            let mut problems = Vec::new();
            if record.id == 0 {
                problems.push(FieldIssue::new(Field::Id, "id must be at least 1"));
            } else if record.id == RecordId::MAX {
                problems.push(FieldIssue::new(Field::Id, "id too large"));
            } else if !seen.insert(record.id) {
                problems.push(FieldIssue::new(
                    Field::Id,
                    format!("duplicate id {}", record.id),
                ));
            }
            match self.policy.check(record.amount_cents, &record.category, record.date) {
                Ok(category) => record.category = category,
                Err(err) => problems.extend(err.issues),
            }

            if problems.is_empty() {
                record.description = clean_description(record.description);
                records.push(record);
            } else {
                issues.push(SnapshotIssue {
                    index,
                    id: record.id,
                    error: ValidationError { issues: problems },
                });
            }
        }

        if !issues.is_empty() {
            return Err(LedgerError::InvalidSnapshot(issues));
        }

        // Ids below RecordId::MAX were checked above
        let max_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        self.records = records;
        self.next_id = self.next_id.max(max_id + 1);
        Ok(())
    }

    fn position(&self, id: RecordId) -> Result<usize, LedgerError> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(LedgerError::NotFound(id))
    }
}
