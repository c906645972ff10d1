//! Error types for preference storage.

/// Errors raised by a [`PrefStore`](crate::PrefStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    /// The stored value has a different kind, or does not fit the requested width.
    #[error("Type mismatch for key '{key}': expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// The value cannot be represented by the backend.
    #[error("Value out of range for key '{key}'")]
    ValueOutOfRange { key: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
