//! Session-based authentication for the elecscore device.
//!
//! This crate provides:
//! - A persistent, ordered session table stored in a flat key-value store
//! - Request validation with expiration-driven eviction
//! - Session removal by slot for administrators
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use elecscore_session::{Authenticator, SessionConfig, SessionTable, Sha256Hasher, SystemClock};
//! use elecscore_store::MemoryStore;
//!
//! let config = SessionConfig::default();
//! let table = SessionTable::new(Arc::new(MemoryStore::new()), config.keys.clone()).into_shared();
//! let auth = Authenticator::new(table, Arc::new(SystemClock::default()), Arc::new(Sha256Hasher), config);
//!
//! let token = auth.create_session("Mozilla/5.0")?;
//! assert!(auth.validate("Mozilla/5.0", Some(&token))?);
//! ```

mod admin;
mod auth;
mod clock;
mod config;
mod configure;
mod cookie;
mod error;
mod hash;
mod table;

pub use admin::SessionAdmin;
pub use auth::Authenticator;
pub use clock::{
    CalendarFields, Clock, DEFAULT_MIN_VALID_YEAR, DEFAULT_UTC_OFFSET_SECS, DeviceTime,
    ManualClock, SystemClock,
};
pub use config::{
    DEFAULT_COUNT_KEY, DEFAULT_TIME_PREFIX, DEFAULT_TOKEN_PREFIX, DEFAULT_TTL_SECS,
    SessionConfig, StorageKeys,
};
pub use configure::{CONFIG_OK, ConfigureError, REMOVE_SESSION_KEY, configure};
pub use cookie::{SESSION_COOKIE, session_cookie, session_id_from_cookie};
pub use error::{Result, SessionError};
pub use hash::{Sha256Hasher, TokenHasher};
pub use table::{SessionRecord, SessionTable, SharedTable};
