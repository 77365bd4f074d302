// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use spendlog::application::ExpenseService;
use spendlog::config::{SaveMode, Settings};
use spendlog::domain::{Clock, NewRecord};
use tempfile::TempDir;

/// Day every test service treats as "today"
pub const TODAY: &str = "2024-01-31";

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

pub fn clock() -> Clock {
    Clock::Fixed(parse_date(TODAY))
}

/// Settings pointing at a data file inside `temp_dir`
pub fn test_settings(temp_dir: &TempDir) -> Settings {
    Settings {
        data_file: data_path(temp_dir),
        ..Settings::default()
    }
}

pub fn data_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("expenses.json")
}

/// Helper to create a test service with a temporary data file
pub fn test_service() -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = ExpenseService::open(&test_settings(&temp_dir), clock())?;
    Ok((service, temp_dir))
}

/// Same as `test_service` but only writing on close
pub fn deferred_service() -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let settings = Settings {
        save_mode: SaveMode::OnExit,
        ..test_settings(&temp_dir)
    };
    let service = ExpenseService::open(&settings, clock())?;
    Ok((service, temp_dir))
}

/// The three expenses used throughout the reporting tests
pub fn add_scenario(service: &mut ExpenseService) -> Result<()> {
    service.add_expense(NewRecord::new(1250, "Food").on(parse_date("2024-01-01")))?;
    service.add_expense(NewRecord::new(700, "Transport").on(parse_date("2024-01-01")))?;
    service.add_expense(NewRecord::new(500, "Food").on(parse_date("2024-01-02")))?;
    Ok(())
}
