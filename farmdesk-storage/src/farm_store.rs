//! The Record Store: sole owner of the four record collections.

use crate::collection::Collection;
use crate::kv::KeyValueStore;
use crate::seed::seed_orders;
use farmdesk_types::{ExpenseRecord, FarmSnapshot, HarvestRecord, Order, Record, WorkRecord};
use std::sync::Arc;
use tracing::info;

/// Harvests, work records, orders and expenses, each kept in memory and
/// written through to durable storage.
pub struct FarmStore {
    harvests: Collection<HarvestRecord>,
    work_records: Collection<WorkRecord>,
    orders: Collection<Order>,
    expenses: Collection<ExpenseRecord>,
}

impl FarmStore {
    /// Loads every collection from `kv`.
    ///
    /// Never fails: unreadable collections start empty. Orders are seeded
    /// with historical sales the first time the store is opened.
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let store = Self {
            harvests: Collection::load(Arc::clone(&kv)),
            work_records: Collection::load(Arc::clone(&kv)),
            orders: Collection::load_or_seed(Arc::clone(&kv), seed_orders),
            expenses: Collection::load(kv),
        };
        info!(
            harvests = store.harvests.len(),
            work_records = store.work_records.len(),
            orders = store.orders.len(),
            expenses = store.expenses.len(),
            "farm store loaded"
        );
        store
    }

    pub fn harvests(&self) -> &Collection<HarvestRecord> {
        &self.harvests
    }

    pub fn harvests_mut(&mut self) -> &mut Collection<HarvestRecord> {
        &mut self.harvests
    }

    pub fn work_records(&self) -> &Collection<WorkRecord> {
        &self.work_records
    }

    pub fn work_records_mut(&mut self) -> &mut Collection<WorkRecord> {
        &mut self.work_records
    }

    pub fn orders(&self) -> &Collection<Order> {
        &self.orders
    }

    pub fn orders_mut(&mut self) -> &mut Collection<Order> {
        &mut self.orders
    }

    pub fn expenses(&self) -> &Collection<ExpenseRecord> {
        &self.expenses
    }

    pub fn expenses_mut(&mut self) -> &mut Collection<ExpenseRecord> {
        &mut self.expenses
    }

    /// The collection holding records of kind `T`.
    pub fn collection<T: FarmRecord>(&self) -> &Collection<T> {
        T::collection(self)
    }

    pub fn collection_mut<T: FarmRecord>(&mut self) -> &mut Collection<T> {
        T::collection_mut(self)
    }

    /// Copies every collection by value.
    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot {
            harvests: self.harvests.items().to_vec(),
            work_records: self.work_records.items().to_vec(),
            orders: self.orders.items().to_vec(),
            expenses: self.expenses.items().to_vec(),
        }
    }
}

/// A record kind owned by [`FarmStore`].
pub trait FarmRecord: Record {
    fn collection(store: &FarmStore) -> &Collection<Self>;

    fn collection_mut(store: &mut FarmStore) -> &mut Collection<Self>;
}

macro_rules! farm_record {
    ($ty:ty, $field:ident) => {
        impl FarmRecord for $ty {
            fn collection(store: &FarmStore) -> &Collection<Self> {
                &store.$field
            }

            fn collection_mut(store: &mut FarmStore) -> &mut Collection<Self> {
                &mut store.$field
            }
        }
    };
}

farm_record!(HarvestRecord, harvests);
farm_record!(WorkRecord, work_records);
farm_record!(Order, orders);
farm_record!(ExpenseRecord, expenses);
