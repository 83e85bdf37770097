//! A write-through collection of one record kind.

use crate::error::StorageResult;
use crate::keys;
use crate::kv::KeyValueStore;
use farmdesk_types::{Record, RecordId};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// In-memory records of one kind, mirrored to durable storage under
/// [`Record::COLLECTION`] after every mutation.
///
/// Each mutation builds the new collection, writes it whole, and only
/// then replaces the in-memory copy. A failed write leaves memory as it
/// was, so the two never diverge.
pub struct Collection<T: Record> {
    items: Vec<T>,
    kv: Arc<dyn KeyValueStore>,
}

impl<T: Record> Collection<T> {
    /// Loads the collection, empty when the key is absent or unreadable.
    pub fn load(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::load_or_seed(kv, Vec::new)
    }

    /// Loads the collection. When the key has never been written, `seed`
    /// provides the initial records, which are persisted right away so
    /// seeding happens once.
    ///
    /// Entries that cannot be read are skipped one by one; a value that is
    /// not an array at all yields an empty collection. Either way the raw
    /// value is first copied to [`keys::unreadable`].
    pub fn load_or_seed(kv: Arc<dyn KeyValueStore>, seed: impl FnOnce() -> Vec<T>) -> Self {
        let key = T::COLLECTION;
        let items = match kv.get(key) {
            Ok(Some(json)) => dedup_ids(parse_tolerant::<T>(kv.as_ref(), &json)),
            Ok(None) => {
                let seeded = seed();
                if !seeded.is_empty() {
                    match write(kv.as_ref(), key, &seeded) {
                        Ok(()) => debug!(key, count = seeded.len(), "seeded collection"),
                        Err(e) => warn!(key, error = %e, "failed to persist seed records"),
                    }
                }
                seeded
            }
            Err(e) => {
                warn!(key, error = %e, "failed to read collection, starting empty");
                Vec::new()
            }
        };
        Self { items, kv }
    }

    /// Adds `record` at the front (most recent first) and persists.
    ///
    /// A record whose id is unassigned or already taken gets a fresh id.
    /// Returns the record as stored, or [`StorageError::Invalid`] without
    /// writing when it fails [`Record::validate`].
    ///
    /// [`StorageError::Invalid`]: crate::StorageError::Invalid
    pub fn add(&mut self, mut record: T) -> StorageResult<T> {
        record.validate()?;
        if record.id().is_unassigned() || self.get(record.id()).is_some() {
            record.set_id(RecordId::new());
        }
        let mut next = Vec::with_capacity(self.items.len() + 1);
        next.push(record.clone());
        next.extend(self.items.iter().cloned());
        self.commit(next)?;
        debug!(collection = T::COLLECTION, id = %record.id(), "record added");
        Ok(record)
    }

    /// Merges `patch` into the record with `id`. Returns `false`, without
    /// writing anything, when no record matches. A merge that leaves the
    /// record invalid is rejected and nothing changes.
    pub fn update(&mut self, id: &RecordId, patch: T::Patch) -> StorageResult<bool> {
        let Some(index) = self.position(id) else {
            debug!(collection = T::COLLECTION, %id, "update ignored, no such record");
            return Ok(false);
        };
        let mut next = self.items.clone();
        next[index].apply(patch);
        next[index].validate()?;
        self.commit(next)?;
        debug!(collection = T::COLLECTION, %id, "record updated");
        Ok(true)
    }

    /// Deletes the record with `id`. Returns `false`, without writing
    /// anything, when no record matches.
    pub fn remove(&mut self, id: &RecordId) -> StorageResult<bool> {
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let mut next = self.items.clone();
        next.remove(index);
        self.commit(next)?;
        debug!(collection = T::COLLECTION, %id, "record removed");
        Ok(true)
    }

    /// Records matching `predicate`, in display order.
    ///
    /// The view borrows the collection and is recomputed on every call.
    pub fn list<'a, F>(&'a self, predicate: F) -> impl Iterator<Item = &'a T> + 'a
    where
        F: Fn(&T) -> bool + 'a,
    {
        self.items.iter().filter(move |record| predicate(*record))
    }

    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.items.iter().find(|record| record.id() == id)
    }

    /// Every record, most recent first.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, id: &RecordId) -> Option<usize> {
        self.items.iter().position(|record| record.id() == id)
    }

    fn commit(&mut self, next: Vec<T>) -> StorageResult<()> {
        write(self.kv.as_ref(), T::COLLECTION, &next)?;
        self.items = next;
        Ok(())
    }
}

/// Reads every well-formed entry of a stored collection.
fn parse_tolerant<T: Record>(kv: &dyn KeyValueStore, json: &str) -> Vec<T> {
    let key = T::COLLECTION;
    let entries = match serde_json::from_str::<Vec<Value>>(json) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(key, error = %e, "stored collection is malformed, starting empty");
            keep_unreadable(kv, key, json);
            return Vec::new();
        }
    };

    let total = entries.len();
    let items: Vec<T> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<T>(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key, index, error = %e, "skipping unreadable record");
                None
            }
        })
        .collect();

    if items.len() < total {
        keep_unreadable(kv, key, json);
    }
    items
}

fn keep_unreadable(kv: &dyn KeyValueStore, key: &str, json: &str) {
    let backup = keys::unreadable(key);
    match kv.put(&backup, json) {
        Ok(()) => warn!(key, backup = %backup, "kept a copy of the unreadable value"),
        Err(e) => warn!(key, error = %e, "failed to keep a copy of the unreadable value"),
    }
}

fn write<T: Record>(kv: &dyn KeyValueStore, key: &str, items: &[T]) -> StorageResult<()> {
    let json = serde_json::to_string(items)?;
    kv.put(key, &json)
}

/// Reassigns ids that collide with an earlier record, so that ids loaded
/// from hand-edited or legacy data stay unique within the collection.
fn dedup_ids<T: Record>(mut items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    for record in &mut items {
        if record.id().is_unassigned() || !seen.insert(record.id().clone()) {
            let fresh = RecordId::new();
            warn!(collection = T::COLLECTION, old = %record.id(), new = %fresh, "reassigned duplicate record id");
            record.set_id(fresh.clone());
            seen.insert(fresh);
        }
    }
    items
}
