//! Flat persistent key-value storage.
//!
//! Keys are plain strings; values are either text or unsigned integers of a
//! caller-chosen width. Backends implement [`PrefStore`] and get the typed
//! accessors for free.
//!
//! ```text
//! PrefStore (trait)   - get/put by string key
//!     └── SqliteStore - durable, namespaced SQLite table
//!     └── MemoryStore - in-process map for tests
//! ```

mod error;
mod memory;
mod sqlite;
mod value;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::{DEFAULT_NAMESPACE, SqliteStore};
pub use value::{PrefStore, PrefValue};
