//! Configuration for the session table and authenticator.

/// Sessions older than this many device-time units are evicted.
pub const DEFAULT_TTL_SECS: u32 = 60 * 60;

/// Store key holding the number of occupied slots.
pub const DEFAULT_COUNT_KEY: &str = "sess-count";

/// Prefix of the per-slot token keys (`sess-u0`, `sess-u1`, ...).
pub const DEFAULT_TOKEN_PREFIX: &str = "sess-u";

/// Prefix of the per-slot creation time keys (`sess-e0`, `sess-e1`, ...).
pub const DEFAULT_TIME_PREFIX: &str = "sess-e";

/// Names of the keys the session table occupies in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub count: String,
    pub token_prefix: String,
    pub time_prefix: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT_KEY.to_string(),
            token_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
            time_prefix: DEFAULT_TIME_PREFIX.to_string(),
        }
    }
}

impl StorageKeys {
    pub fn token(&self, slot: usize) -> String {
        format!("{}{}", self.token_prefix, slot)
    }

    pub fn created_at(&self, slot: usize) -> String {
        format!("{}{}", self.time_prefix, slot)
    }
}

/// Configuration for session validation and creation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum session age in device-time units. A session is evicted when
    /// its age is strictly greater than this.
    pub ttl: u32,

    /// Store key layout.
    pub keys: StorageKeys,

    /// Upper bound on stored sessions. When the table is full, creating a
    /// session first evicts the oldest one. `None` leaves the table unbounded.
    pub max_sessions: Option<usize>,

    /// After evicting an expired session during validation, re-examine the
    /// slot that was shifted into its place. When false, the scan moves on
    /// and that record is only seen by the next validation.
    pub rescan_after_evict: bool,

    /// Require the presented token to equal the hash of the client identity.
    /// Off by default: any non-empty token is accepted as long as the
    /// identity hash has a live session.
    pub require_token_match: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL_SECS,
            keys: StorageKeys::default(),
            max_sessions: None,
            rescan_after_evict: false,
            require_token_match: false,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Cap the number of stored sessions. A cap of zero is raised to one, so
    /// the session being created always fits.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = Some(max.max(1));
        self
    }

    pub fn without_max_sessions(mut self) -> Self {
        self.max_sessions = None;
        self
    }

    pub fn with_rescan_after_evict(mut self, enabled: bool) -> Self {
        self.rescan_after_evict = enabled;
        self
    }

    pub fn with_token_match(mut self, required: bool) -> Self {
        self.require_token_match = required;
        self
    }
}
