pub mod aggregate;
mod category;
mod error;
mod ledger;
mod money;
mod record;

pub use aggregate::Granularity;
pub use category::*;
pub use error::*;
pub use ledger::*;
pub use money::*;
pub use record::{NewRecord, Record, RecordId, RecordUpdate};
