//! Key/value configuration requests from the admin page.
//!
//! The page sends `key` and `value` strings and expects a short result code
//! back (`ok`, `missing-param`, `value-numeric`, `invalid-key`,
//! `out-of-bounds`, `storage-error`).

use tracing::debug;

use crate::admin::SessionAdmin;
use crate::error::SessionError;

/// Config key that removes the session at the numeric index given as value.
pub const REMOVE_SESSION_KEY: &str = "delSession";

/// Result code for a request that was applied.
pub const CONFIG_OK: &str = "ok";

/// A configuration request that could not be applied.
#[derive(Debug, thiserror::Error)]
pub enum ConfigureError {
    #[error("missing value for config key '{0}'")]
    MissingParam(String),

    #[error("value '{0}' is not numeric")]
    NotNumeric(String),

    #[error("invalid config key '{0}'")]
    InvalidKey(String),

    #[error("session index {index} out of bounds (count {count})")]
    OutOfBounds { index: usize, count: usize },

    #[error(transparent)]
    Session(SessionError),
}

impl ConfigureError {
    /// Wire code reported back to the admin page.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigureError::MissingParam(_) => "missing-param",
            ConfigureError::NotNumeric(_) => "value-numeric",
            ConfigureError::InvalidKey(_) => "invalid-key",
            ConfigureError::OutOfBounds { .. } => "out-of-bounds",
            ConfigureError::Session(_) => "storage-error",
        }
    }
}

impl From<SessionError> for ConfigureError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::OutOfBounds { index, count } => {
                ConfigureError::OutOfBounds { index, count }
            }
            other => ConfigureError::Session(other),
        }
    }
}

/// Apply a single `key = value` configuration request.
///
/// Returns [`CONFIG_OK`] on success.
pub fn configure(
    admin: &SessionAdmin,
    key: &str,
    value: Option<&str>,
) -> Result<&'static str, ConfigureError> {
    match key {
        REMOVE_SESSION_KEY => {
            let value = value.ok_or_else(|| ConfigureError::MissingParam(key.to_string()))?;
            let index = parse_index(value)?;
            debug!(index, "Removing session via config request");
            admin.remove_by_index(usize::from(index))?;
            Ok(CONFIG_OK)
        }
        _ => {
            debug!(key, "Invalid config key");
            Err(ConfigureError::InvalidKey(key.to_string()))
        }
    }
}

/// Session indices are unsigned 16-bit decimals.
fn parse_index(value: &str) -> Result<u16, ConfigureError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigureError::NotNumeric(value.to_string()));
    }
    value
        .parse()
        .map_err(|_| ConfigureError::NotNumeric(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DeviceTime;
    use crate::config::StorageKeys;
    use crate::table::SessionTable;
    use elecscore_store::{MemoryStore, PrefStore};
    use std::sync::Arc;

    fn admin() -> SessionAdmin {
        let table = SessionTable::new(Arc::new(MemoryStore::new()), StorageKeys::default())
            .into_shared();
        for t in ["A", "B", "C"] {
            table.lock().append(t, DeviceTime::from_raw(0)).unwrap();
        }
        SessionAdmin::new(table)
    }

    #[test]
    fn test_remove_session() {
        let admin = admin();
        assert_eq!(configure(&admin, "delSession", Some("1")).unwrap(), CONFIG_OK);
        assert_eq!(admin.render_listing().unwrap(), "A,0;C,0;");
    }

    #[test]
    fn test_error_codes() {
        let admin = admin();
        let code = |key: &str, value: Option<&str>| configure(&admin, key, value).unwrap_err().code();

        assert_eq!(code("delSession", None), "missing-param");
        assert_eq!(code("delSession", Some("")), "value-numeric");
        assert_eq!(code("delSession", Some("-1")), "value-numeric");
        assert_eq!(code("delSession", Some("1a")), "value-numeric");
        assert_eq!(code("delSession", Some("70000")), "value-numeric");
        assert_eq!(code("delSession", Some("3")), "out-of-bounds");
        assert_eq!(code("wifiSsid", Some("x")), "invalid-key");

        assert_eq!(admin.len().unwrap(), 3);
    }

    #[test]
    fn test_unreadable_count_reports_storage_error() {
        let store = Arc::new(MemoryStore::new());
        store.put_string("sess-count", "three").unwrap();
        let admin = SessionAdmin::new(SessionTable::new(store, StorageKeys::default()).into_shared());

        let err = configure(&admin, "delSession", Some("0")).unwrap_err();
        assert!(matches!(err, ConfigureError::Session(_)));
        assert_eq!(err.code(), "storage-error");
    }
}
