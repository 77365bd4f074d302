use std::fmt;

use thiserror::Error;

use super::RecordId;

/// The record field a validation issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Amount,
    Category,
    Date,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Amount => "amount",
            Field::Category => "category",
            Field::Date => "date",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: Field,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One or more field invariants were violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid record: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: Field, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }

    pub fn has_issue(&self, field: Field) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A snapshot entry that could not be loaded, with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotIssue {
    pub index: usize,
    pub id: RecordId,
    pub error: ValidationError,
}

impl fmt::Display for SnapshotIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry #{} (id {}): {}", self.index + 1, self.id, self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Record not found: {0}")]
    NotFound(RecordId),

    #[error("Snapshot rejected: {}", describe_snapshot_issues(.0))]
    InvalidSnapshot(Vec<SnapshotIssue>),
}

fn describe_snapshot_issues(issues: &[SnapshotIssue]) -> String {
    let noun = if issues.len() == 1 { "entry" } else { "entries" };
    let details = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} invalid {}: {}", issues.len(), noun, details)
}
