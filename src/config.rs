use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{CategoryPolicy, Clock, DEFAULT_CATEGORIES, LedgerPolicy};
use crate::storage::DEFAULT_DATA_FILE;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// When the data file is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveMode {
    /// After every successful add, edit or delete.
    #[default]
    EachMutation,
    /// Only when the session ends.
    OnExit,
}

/// What to do when the data file exists but cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailure {
    #[default]
    Abort,
    StartEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_file: PathBuf,
    pub allow_future_dates: bool,
    pub restrict_categories: bool,
    pub categories: Vec<String>,
    pub save_mode: SaveMode,
    pub on_load_error: LoadFailure,
    pub recent_days: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            allow_future_dates: false,
            restrict_categories: false,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            save_mode: SaveMode::default(),
            on_load_error: LoadFailure::default(),
            recent_days: 7,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. A missing file yields the defaults;
    /// unknown keys are ignored and absent keys take their default.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let settings: Settings =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        debug!(path = %path.display(), ?settings, "loaded config");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_days == 0 {
            return Err(ConfigError::Invalid("recent_days must be at least 1".into()));
        }
        if self.restrict_categories && self.categories.is_empty() {
            return Err(ConfigError::Invalid(
                "restrict_categories is set but the category list is empty".into(),
            ));
        }
        if let Some(blank) = self.categories.iter().find(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "category list contains a blank entry '{}'",
                blank
            )));
        }
        Ok(())
    }

    /// Ledger rules derived from these settings.
    pub fn ledger_policy(&self, clock: Clock) -> LedgerPolicy {
        let categories = if self.restrict_categories {
            CategoryPolicy::Restricted(self.categories.clone())
        } else {
            CategoryPolicy::FreeText
        };
        LedgerPolicy {
            allow_future_dates: self.allow_future_dates,
            categories,
            clock,
        }
    }
}
