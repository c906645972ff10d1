//! Out-of-band session administration.
//!
//! Sessions are addressed purely by slot, the way the device's admin page
//! lists them. Slots shift after every removal, so an index is only
//! meaningful against the listing it was read from.

use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::table::{SessionRecord, SharedTable};

pub struct SessionAdmin {
    table: SharedTable,
}

impl SessionAdmin {
    pub fn new(table: SharedTable) -> Self {
        Self { table }
    }

    pub fn len(&self) -> Result<usize> {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.table.lock().is_empty()
    }

    /// Snapshot of every stored session in slot order.
    pub fn list(&self) -> Result<Vec<SessionRecord>> {
        self.table.lock().records()
    }

    /// Render the listing as `token,created_at;` per slot.
    pub fn render_listing(&self) -> Result<String> {
        Ok(self
            .list()?
            .iter()
            .map(|r| format!("{},{};", r.token, r.created_at))
            .collect())
    }

    /// Remove the session at `index`, shifting later sessions down.
    ///
    /// Returns [`SessionError::OutOfBounds`] and leaves the table untouched
    /// if `index` is not an occupied slot.
    pub fn remove_by_index(&self, index: usize) -> Result<SessionRecord> {
        match self.table.lock().remove_at(index) {
            Ok(removed) => {
                info!(slot = index, "Session removed by administrator");
                Ok(removed)
            }
            Err(e @ SessionError::OutOfBounds { .. }) => {
                warn!(slot = index, "Rejected session removal: {e}");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DeviceTime;
    use crate::config::StorageKeys;
    use crate::table::SessionTable;
    use elecscore_store::MemoryStore;
    use std::sync::Arc;

    fn admin_with(tokens: &[&str]) -> SessionAdmin {
        let table = SessionTable::new(Arc::new(MemoryStore::new()), StorageKeys::default())
            .into_shared();
        for (i, t) in tokens.iter().enumerate() {
            table
                .lock()
                .append(t, DeviceTime::from_raw(100 + i as u32))
                .unwrap();
        }
        SessionAdmin::new(table)
    }

    #[test]
    fn test_remove_middle() {
        let admin = admin_with(&["A", "B", "C"]);
        let removed = admin.remove_by_index(1).unwrap();
        assert_eq!(removed.token, "B");

        let tokens: Vec<_> = admin.list().unwrap().into_iter().map(|r| r.token).collect();
        assert_eq!(tokens, vec!["A", "C"]);
        assert_eq!(admin.len().unwrap(), 2);
    }

    #[test]
    fn test_out_of_bounds_leaves_table_unchanged() {
        let admin = admin_with(&["A", "B", "C"]);
        let before = admin.list().unwrap();

        for index in [3, 8] {
            let err = admin.remove_by_index(index).unwrap_err();
            assert!(matches!(err, SessionError::OutOfBounds { count: 3, .. }));
        }
        assert_eq!(admin.list().unwrap(), before);
    }

    #[test]
    fn test_remove_from_empty_table() {
        let admin = admin_with(&[]);
        assert!(admin.is_empty().unwrap());
        assert!(matches!(
            admin.remove_by_index(0),
            Err(SessionError::OutOfBounds { index: 0, count: 0 })
        ));
    }

    #[test]
    fn test_render_listing() {
        let admin = admin_with(&["A", "B"]);
        assert_eq!(admin.render_listing().unwrap(), "A,100;B,101;");
        assert_eq!(admin_with(&[]).render_listing().unwrap(), "");
    }
}
