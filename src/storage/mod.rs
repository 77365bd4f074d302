mod store;

pub use store::*;

/// Data file used when neither the config nor the command line names one.
pub const DEFAULT_DATA_FILE: &str = "expenses.json";
