use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::{LoadFailure, SaveMode, Settings};
use crate::domain::{
    CategoryPolicy, Cents, Clock, Granularity, Ledger, NewRecord, Record, RecordId, RecordUpdate,
    SortOrder, aggregate, format_cents,
};
use crate::storage::JsonStore;

use super::{AppError, CategoryDetail, PeriodReport, SpendingSummary};

/// Application service owning one ledger and its data file.
/// This is the interface the CLI and the interactive menu drive.
pub struct ExpenseService {
    ledger: Ledger,
    store: JsonStore,
    save_mode: SaveMode,
    recent_days: u32,
    categories: Vec<String>,
    dirty: bool,
}

impl ExpenseService {
    /// Build a service around an already populated ledger.
    pub fn new(ledger: Ledger, store: JsonStore, save_mode: SaveMode) -> Self {
        let defaults = Settings::default();
        Self {
            ledger,
            store,
            save_mode,
            recent_days: defaults.recent_days,
            categories: defaults.categories,
            dirty: false,
        }
    }

    /// Open the data file named in `settings`.
    ///
    /// A missing file gives an empty ledger. An unreadable or invalid file
    /// either fails or gives an empty ledger, depending on
    /// `settings.on_load_error`; it is never partially loaded.
    pub fn open(settings: &Settings, clock: Clock) -> Result<Self, AppError> {
        settings.validate()?;
        let store = JsonStore::new(&settings.data_file);
        let mut ledger = Ledger::with_policy(settings.ledger_policy(clock));

        let loaded = store
            .load()
            .map_err(AppError::from)
            .and_then(|snapshot| ledger.load_from(snapshot).map_err(AppError::from));

        if let Err(err) = loaded {
            match settings.on_load_error {
                LoadFailure::Abort => return Err(err),
                LoadFailure::StartEmpty => {
                    warn!(
                        path = %store.path().display(),
                        error = %err,
                        "could not load data file, starting with an empty ledger; the file will be replaced on the next save"
                    );
                    ledger = Ledger::with_policy(settings.ledger_policy(clock));
                }
            }
        }

        info!(
            path = %store.path().display(),
            records = ledger.len(),
            save_mode = ?settings.save_mode,
            "opened expense ledger"
        );

        let mut service = Self::new(ledger, store, settings.save_mode);
        service.recent_days = settings.recent_days;
        service.categories = settings.categories.clone();
        Ok(service)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// True when the ledger holds changes not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // ========================
    // Record operations
    // ========================

    pub fn add_expense(&mut self, new: NewRecord) -> Result<Record, AppError> {
        let record = self.ledger.add(new)?.clone();
        info!(
            id = record.id,
            amount = %format_cents(record.amount_cents),
            category = %record.category,
            date = %record.date,
            "added expense"
        );
        self.after_mutation()?;
        Ok(record)
    }

    pub fn edit_expense(&mut self, id: RecordId, update: RecordUpdate) -> Result<Record, AppError> {
        if update.is_empty() {
            return Ok(self.get_expense(id)?.clone());
        }
        let record = self.ledger.edit(id, update)?.clone();
        info!(id, "edited expense");
        self.after_mutation()?;
        Ok(record)
    }

    pub fn delete_expense(&mut self, id: RecordId) -> Result<Record, AppError> {
        let record = self.ledger.delete(id)?;
        info!(id, "deleted expense");
        self.after_mutation()?;
        Ok(record)
    }

    pub fn get_expense(&self, id: RecordId) -> Result<&Record, AppError> {
        Ok(self.ledger.get(id)?)
    }

    pub fn list_expenses(&self, order: SortOrder) -> Vec<Record> {
        self.ledger.list_sorted(order)
    }

    /// Categories that currently have at least one expense, sorted by name.
    pub fn used_categories(&self) -> Vec<String> {
        aggregate::by_category(self.ledger.list()).into_keys().collect()
    }

    /// Categories to offer when prompting: the restricted set if there is
    /// one, otherwise the configured suggestions.
    pub fn category_choices(&self) -> Vec<String> {
        match &self.ledger.policy().categories {
            CategoryPolicy::Restricted(allowed) => allowed.clone(),
            CategoryPolicy::FreeText => self.categories.clone(),
        }
    }

    // ========================
    // Aggregation
    // ========================

    pub fn total(&self) -> Cents {
        aggregate::total(self.ledger.list())
    }

    pub fn totals_by_category(&self) -> BTreeMap<String, Cents> {
        aggregate::by_category(self.ledger.list())
    }

    pub fn period_report(&self, granularity: Granularity) -> PeriodReport {
        debug!(%granularity, records = self.ledger.len(), "building period report");
        PeriodReport::build(self.ledger.list(), granularity)
    }

    pub fn summary(&self) -> SpendingSummary {
        debug!(records = self.ledger.len(), "building spending summary");
        SpendingSummary::build(self.ledger.list(), self.ledger.today(), self.recent_days)
    }

    pub fn category_detail(&self, category: &str) -> Result<CategoryDetail, AppError> {
        CategoryDetail::build(self.ledger.list(), category)
            .ok_or_else(|| AppError::CategoryNotFound(category.trim().to_string()))
    }

    // ========================
    // Persistence
    // ========================

    /// Write the ledger to its data file now.
    pub fn save(&mut self) -> Result<(), AppError> {
        self.store.save(&self.ledger.to_snapshot())?;
        self.dirty = false;
        info!(path = %self.store.path().display(), records = self.ledger.len(), "saved expenses");
        Ok(())
    }

    /// End the session, writing any unsaved changes.
    pub fn close(mut self) -> Result<(), AppError> {
        if self.dirty {
            self.save()?;
        }
        Ok(())
    }

    /// A failed write leaves the change in memory and the service dirty, so
    /// a later save can retry.
    fn after_mutation(&mut self) -> Result<(), AppError> {
        self.dirty = true;
        match self.save_mode {
            SaveMode::EachMutation => self.save(),
            SaveMode::OnExit => Ok(()),
        }
    }
}
