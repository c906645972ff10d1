//! The storage trait and its value model.

use crate::error::{Result, StoreError};

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefValue {
    Text(String),
    Integer(i64),
}

impl PrefValue {
    fn into_text(self, key: &str) -> Result<String> {
        match self {
            PrefValue::Text(s) => Ok(s),
            PrefValue::Integer(_) => Err(mismatch(key, "string")),
        }
    }

    fn into_unsigned<T: TryFrom<i64>>(self, key: &str, expected: &'static str) -> Result<T> {
        match self {
            PrefValue::Integer(i) => T::try_from(i).map_err(|_| mismatch(key, expected)),
            PrefValue::Text(_) => Err(mismatch(key, expected)),
        }
    }
}

fn mismatch(key: &str, expected: &'static str) -> StoreError {
    StoreError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

/// Durable mapping of string keys to typed values.
///
/// Each `put` must be visible to the next `get` on any handle to the same
/// store. Reads and writes that must be seen as one step go through
/// [`PrefStore::atomically`].
pub trait PrefStore: Send + Sync {
    /// Read the raw value under `key`, or `None` if it was never written.
    fn get(&self, key: &str) -> Result<Option<PrefValue>>;

    /// Write `value` under `key`, replacing whatever was there.
    fn put(&self, key: &str, value: PrefValue) -> Result<()>;

    /// Run `f` so that no other handle to the store, in this process or
    /// another, observes or interleaves with its reads and writes.
    ///
    /// If `f` fails, none of its writes are kept. Calls may nest; the
    /// innermost ones join the outermost.
    ///
    /// The default runs `f` directly, which suits backends that only live
    /// inside one process and are already serialized by their caller.
    fn atomically(&self, f: &mut dyn FnMut() -> Result<()>) -> Result<()> {
        f()
    }

    // ── Typed accessors ─────────────────────────────────────────────────

    fn get_string(&self, key: &str, default: &str) -> Result<String> {
        match self.get(key)? {
            Some(v) => v.into_text(key),
            None => Ok(default.to_string()),
        }
    }

    fn get_u16(&self, key: &str, default: u16) -> Result<u16> {
        match self.get(key)? {
            Some(v) => v.into_unsigned(key, "u16"),
            None => Ok(default),
        }
    }

    fn get_u32(&self, key: &str, default: u32) -> Result<u32> {
        match self.get(key)? {
            Some(v) => v.into_unsigned(key, "u32"),
            None => Ok(default),
        }
    }

    fn get_u64(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key)? {
            Some(v) => v.into_unsigned(key, "u64"),
            None => Ok(default),
        }
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, PrefValue::Text(value.to_string()))
    }

    fn put_u16(&self, key: &str, value: u16) -> Result<()> {
        self.put(key, PrefValue::Integer(i64::from(value)))
    }

    fn put_u32(&self, key: &str, value: u32) -> Result<()> {
        self.put(key, PrefValue::Integer(i64::from(value)))
    }

    fn put_u64(&self, key: &str, value: u64) -> Result<()> {
        let value = i64::try_from(value).map_err(|_| StoreError::ValueOutOfRange {
            key: key.to_string(),
        })?;
        self.put(key, PrefValue::Integer(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    #[test]
    fn test_missing_keys_return_default() {
        let store = MemoryStore::new();
        assert_eq!(store.get_string("nope", "fallback").unwrap(), "fallback");
        assert_eq!(store.get_u32("nope", 7).unwrap(), 7);
        assert_eq!(store.get_u16("nope", 0).unwrap(), 0);
    }

    #[test]
    fn test_integer_widths_share_a_key() {
        let store = MemoryStore::new();
        store.put_u16("count", 3).unwrap();
        assert_eq!(store.get_u32("count", 0).unwrap(), 3);
        assert_eq!(store.get_u64("count", 0).unwrap(), 3);
    }

    #[test]
    fn test_narrow_read_of_wide_value_fails() {
        let store = MemoryStore::new();
        store.put_u32("big", 70_000).unwrap();
        let err = store.get_u16("big", 0).unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { expected: "u16", .. }));
    }

    #[test]
    fn test_kind_mismatch_is_an_error() {
        let store = MemoryStore::new();
        store.put_string("name", "abc").unwrap();
        assert!(store.get_u32("name", 0).is_err());

        store.put_u32("num", 1).unwrap();
        assert!(store.get_string("num", "").is_err());
    }

    #[test]
    fn test_u64_above_i64_rejected() {
        let store = MemoryStore::new();
        let err = store.put_u64("huge", u64::MAX).unwrap_err();
        assert!(matches!(err, StoreError::ValueOutOfRange { .. }));
        assert_eq!(store.get("huge").unwrap(), None);
    }
}
