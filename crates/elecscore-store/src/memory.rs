use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::value::{PrefStore, PrefValue};

/// In-memory [`PrefStore`] for testing. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, PrefValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys written so far.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: PrefValue) -> Result<()> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }
}
