//! The persistent, ordered session table.
//!
//! Records live in the store as two parallel key families indexed by slot,
//! plus a count:
//!
//! ```text
//! sess-count = 3
//! sess-u0 = <token>   sess-e0 = <created_at>
//! sess-u1 = <token>   sess-e1 = <created_at>
//! sess-u2 = <token>   sess-e2 = <created_at>
//! ```
//!
//! Slots `0..count` are always contiguous. Anything at `count` or beyond is
//! stale and never read as a live record.

use std::sync::Arc;

use elecscore_store::{self as store, PrefStore, StoreError};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::clock::DeviceTime;
use crate::config::StorageKeys;
use crate::error::{Result, SessionError};

/// A session table shared between the authenticator and the admin surface.
///
/// All mutation happens under this one lock, so a compaction is never
/// observed half-done.
pub type SharedTable = Arc<Mutex<SessionTable>>;

/// One occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub slot: usize,
    pub token: String,
    pub created_at: DeviceTime,
}

/// Ordered list of sessions persisted in a [`PrefStore`].
pub struct SessionTable {
    store: Arc<dyn PrefStore>,
    keys: StorageKeys,
}

impl SessionTable {
    pub fn new(store: Arc<dyn PrefStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Wrap the table for sharing.
    pub fn into_shared(self) -> SharedTable {
        Arc::new(Mutex::new(self))
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Number of occupied slots.
    pub fn len(&self) -> Result<usize> {
        Ok(self.count()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read the record at `slot`.
    pub fn get(&self, slot: usize) -> Result<SessionRecord> {
        let count = self.len()?;
        if slot >= count {
            return Err(SessionError::OutOfBounds { index: slot, count });
        }
        Ok(self.read_slot(slot)?)
    }

    /// All records in slot order.
    pub fn records(&self) -> Result<Vec<SessionRecord>> {
        let mut records = Vec::new();
        self.store.atomically(&mut || {
            records = (0..self.count()?)
                .map(|slot| self.read_slot(slot))
                .collect::<store::Result<_>>()?;
            Ok(())
        })?;
        Ok(records)
    }

    /// Run `f` as one step against the store.
    ///
    /// Other handles to the same store, including ones in other processes,
    /// see either none or all of its writes. A storage failure inside `f`
    /// discards its writes. Other errors keep what `f` already wrote, so `f`
    /// raises them before its first write.
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let store = Arc::clone(&self.store);
        let mut f = Some(f);
        let mut outcome = None;
        store.atomically(&mut || {
            let Some(f) = f.take() else {
                return Ok(());
            };
            match f(&mut *self) {
                Err(SessionError::Store(e)) => Err(e),
                result => {
                    outcome = Some(result);
                    Ok(())
                }
            }
        })?;
        outcome.unwrap_or(Err(SessionError::Skipped))
    }

    /// Write a record at the end of the table and return its slot.
    pub fn append(&mut self, token: &str, created_at: DeviceTime) -> Result<usize> {
        let slot = self.atomically(|table| {
            let slot = table.count()?;
            table.write_slot(slot, token, created_at)?;
            table.write_count(slot + 1)?;
            Ok(slot)
        })?;
        trace!(slot, created_at = %created_at, "Appended session");
        Ok(slot)
    }

    /// Remove the record at `slot`, shifting every later record one slot left.
    ///
    /// Fails without touching the store if `slot` is not occupied.
    pub fn remove_at(&mut self, slot: usize) -> Result<SessionRecord> {
        let (removed, count) = self.atomically(|table| {
            let count = table.count()?;
            if slot >= count {
                return Err(SessionError::OutOfBounds { index: slot, count });
            }

            let removed = table.read_slot(slot)?;
            for i in slot..count - 1 {
                let next = table.read_slot(i + 1)?;
                table.write_slot(i, &next.token, next.created_at)?;
                trace!(from = i + 1, to = i, "Shifted session");
            }
            table.write_count(count - 1)?;
            Ok((removed, count - 1))
        })?;

        debug!(slot, count, "Removed session");
        Ok(removed)
    }

    fn count(&self) -> store::Result<usize> {
        Ok(self.store.get_u32(&self.keys.count, 0)? as usize)
    }

    fn read_slot(&self, slot: usize) -> store::Result<SessionRecord> {
        let token = self.store.get_string(&self.keys.token(slot), "")?;
        let created_at = self.store.get_u32(&self.keys.created_at(slot), 0)?;
        Ok(SessionRecord {
            slot,
            token,
            created_at: DeviceTime::from_raw(created_at),
        })
    }

    fn write_slot(&self, slot: usize, token: &str, created_at: DeviceTime) -> store::Result<()> {
        self.store.put_string(&self.keys.token(slot), token)?;
        self.store
            .put_u32(&self.keys.created_at(slot), created_at.as_u32())
    }

    fn write_count(&self, count: usize) -> store::Result<()> {
        let count = u32::try_from(count).map_err(|_| StoreError::ValueOutOfRange {
            key: self.keys.count.clone(),
        })?;
        self.store.put_u32(&self.keys.count, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elecscore_store::{MemoryStore, PrefValue};

    fn table() -> (Arc<MemoryStore>, SessionTable) {
        let store = Arc::new(MemoryStore::new());
        let table = SessionTable::new(store.clone(), StorageKeys::default());
        (store, table)
    }

    fn tokens(table: &SessionTable) -> Vec<String> {
        table
            .records()
            .unwrap()
            .into_iter()
            .map(|r| r.token)
            .collect()
    }

    #[test]
    fn test_empty_table() {
        let (_, table) = table();
        assert_eq!(table.len().unwrap(), 0);
        assert!(table.is_empty().unwrap());
        assert!(table.records().unwrap().is_empty());
    }

    #[test]
    fn test_append_assigns_sequential_slots() {
        let (store, mut table) = table();
        assert_eq!(table.append("a", DeviceTime::from_raw(10)).unwrap(), 0);
        assert_eq!(table.append("b", DeviceTime::from_raw(20)).unwrap(), 1);

        assert_eq!(table.len().unwrap(), 2);
        assert_eq!(store.get_u32("sess-count", 0).unwrap(), 2);
        assert_eq!(store.get_string("sess-u1", "").unwrap(), "b");
        assert_eq!(store.get_u32("sess-e1", 0).unwrap(), 20);

        let rec = table.get(0).unwrap();
        assert_eq!(rec.token, "a");
        assert_eq!(rec.created_at, DeviceTime::from_raw(10));
    }

    #[test]
    fn test_get_past_end_is_out_of_bounds() {
        let (_, mut table) = table();
        table.append("a", DeviceTime::from_raw(1)).unwrap();
        let err = table.get(1).unwrap_err();
        assert!(matches!(err, SessionError::OutOfBounds { index: 1, count: 1 }));
    }

    #[test]
    fn test_remove_at_shifts_left() {
        let (_, mut table) = table();
        for (i, t) in ["a", "b", "c", "d"].iter().enumerate() {
            table.append(t, DeviceTime::from_raw(i as u32)).unwrap();
        }

        let removed = table.remove_at(1).unwrap();
        assert_eq!(removed.token, "b");
        assert_eq!(tokens(&table), vec!["a", "c", "d"]);

        // Creation times travel with their tokens.
        assert_eq!(table.get(1).unwrap().created_at, DeviceTime::from_raw(2));
        assert_eq!(table.get(2).unwrap().created_at, DeviceTime::from_raw(3));
    }

    #[test]
    fn test_remove_last_and_only() {
        let (_, mut table) = table();
        table.append("a", DeviceTime::from_raw(1)).unwrap();
        table.append("b", DeviceTime::from_raw(2)).unwrap();

        table.remove_at(1).unwrap();
        assert_eq!(tokens(&table), vec!["a"]);

        table.remove_at(0).unwrap();
        assert!(table.is_empty().unwrap());
    }

    #[test]
    fn test_remove_out_of_bounds_leaves_store_untouched() {
        let (store, mut table) = table();
        table.append("a", DeviceTime::from_raw(1)).unwrap();
        let keys_before = store.len();

        assert!(matches!(
            table.remove_at(1),
            Err(SessionError::OutOfBounds { index: 1, count: 1 })
        ));
        assert_eq!(table.len().unwrap(), 1);
        assert_eq!(store.len(), keys_before);
    }

    #[test]
    fn test_stale_slots_past_count_are_ignored() {
        let (_, mut table) = table();
        table.append("a", DeviceTime::from_raw(1)).unwrap();
        table.append("b", DeviceTime::from_raw(2)).unwrap();
        table.remove_at(0).unwrap();

        // sess-u1 still holds "b" in the store, but it is past the count.
        assert_eq!(tokens(&table), vec!["b"]);

        // The next append overwrites the stale slot.
        table.append("c", DeviceTime::from_raw(3)).unwrap();
        assert_eq!(tokens(&table), vec!["b", "c"]);
    }

    #[test]
    fn test_empty_token_is_stored_as_is() {
        let (_, mut table) = table();
        table.append("", DeviceTime::from_raw(1)).unwrap();
        assert_eq!(table.get(0).unwrap().token, "");
    }

    struct SkippingStore(MemoryStore);

    impl PrefStore for SkippingStore {
        fn get(&self, key: &str) -> store::Result<Option<PrefValue>> {
            self.0.get(key)
        }

        fn put(&self, key: &str, value: PrefValue) -> store::Result<()> {
            self.0.put(key, value)
        }

        fn atomically(&self, _f: &mut dyn FnMut() -> store::Result<()>) -> store::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_skipped_atomic_step_is_an_error() {
        let mut table = SessionTable::new(
            Arc::new(SkippingStore(MemoryStore::new())),
            StorageKeys::default(),
        );
        assert!(matches!(
            table.append("a", DeviceTime::from_raw(1)),
            Err(SessionError::Skipped)
        ));
        assert!(table.is_empty().unwrap());
    }
}
