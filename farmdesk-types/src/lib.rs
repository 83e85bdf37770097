//! Core type definitions for farmdesk.
//!
//! This crate defines the plain data types shared by every other crate:
//! - Record identifiers and ISO calendar dates
//! - The four record kinds (harvests, work records, orders, expenses)
//! - The replication snapshot and the sync configuration record
//! - Entry forms that validate raw user input before a record exists
//! - Derived summaries (revenue, profit, per-period reports)
//!
//! Nothing here performs I/O. Persistence lives in `farmdesk-storage` and
//! replication in `farmdesk-sync`.

mod date;
pub mod filters;
pub mod forms;
mod ids;
mod records;
mod snapshot;
pub mod summary;
mod sync_config;

pub use date::{IsoDate, Period};
pub use forms::{ExpenseForm, HarvestForm, OrderForm, ValidationError, WorkForm};
pub use ids::RecordId;
pub use records::{
    ExpenseCategory, ExpensePatch, ExpenseRecord, GreenhouseNumber, HarvestPatch, HarvestRecord,
    Order, OrderPatch, OrderStatus, PaymentStatus, Record, Task, VegetableType, WorkPatch,
    WorkRecord,
};
pub use snapshot::FarmSnapshot;
pub use sync_config::{SyncConfig, SyncConfigPatch, DEFAULT_ENDPOINT_URL};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing the crate's value types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("greenhouse must be between 1 and {max}, got {value}")]
    InvalidGreenhouse { value: u8, max: u8 },
}
