//! Point-in-time copy of every record collection.

use crate::{ExpenseRecord, HarvestRecord, Order, WorkRecord};
use serde::{Deserialize, Serialize};

/// All four collections, copied by value.
///
/// This is the replication request body and the data the assistant is
/// briefed with. Holding a snapshot never borrows the live store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmSnapshot {
    #[serde(default)]
    pub harvests: Vec<HarvestRecord>,
    #[serde(default)]
    pub work_records: Vec<WorkRecord>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
}

impl FarmSnapshot {
    /// Total number of records across the four collections.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.harvests.len() + self.work_records.len() + self.orders.len() + self.expenses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }
}
