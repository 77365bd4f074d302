use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::{LedgerError, RecordId, SnapshotIssue, ValidationError};
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Expense not found: {0}")]
    NotFound(RecordId),

    #[error("No expenses recorded in category: {0}")]
    CategoryNotFound(String),

    #[error("Data file contains invalid records: {}", describe(.0))]
    InvalidData(Vec<SnapshotIssue>),

    #[error(transparent)]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Errors the user can fix by re-entering input.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }

    /// Errors that mean the data file could not be used.
    pub fn is_persistence(&self) -> bool {
        matches!(self, AppError::Persistence(_) | AppError::InvalidData(_))
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Validation(e) => AppError::Validation(e),
            LedgerError::NotFound(id) => AppError::NotFound(id),
            LedgerError::InvalidSnapshot(issues) => AppError::InvalidData(issues),
        }
    }
}

fn describe(issues: &[SnapshotIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
