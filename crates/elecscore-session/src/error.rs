//! Error types for session table operations.

use elecscore_store::StoreError;

/// Error type for session operations.
///
/// An unauthenticated request is not an error: [`Authenticator::validate`]
/// reports it as `Ok(false)`.
///
/// [`Authenticator::validate`]: crate::Authenticator::validate
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backing store could not be read or written.
    #[error("Session storage error: {0}")]
    Store(#[from] StoreError),

    /// A slot index at or past the end of the table.
    #[error("Session index {index} out of bounds (count {count})")]
    OutOfBounds { index: usize, count: usize },

    /// The store returned from an atomic step without running it.
    #[error("Session store skipped an atomic step")]
    Skipped,
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
