//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [store]
//! path = "/var/lib/elecscore/prefs.db"
//! namespace = "elec-score"
//!
//! [session]
//! ttl_secs = 3600
//! max_sessions = 32
//!
//! [clock]
//! utc_offset_secs = 3600
//!
//! [logging]
//! level = "info"
//! ```

use std::path::PathBuf;

use elecscore_session::{
    DEFAULT_COUNT_KEY, DEFAULT_MIN_VALID_YEAR, DEFAULT_TIME_PREFIX, DEFAULT_TOKEN_PREFIX,
    DEFAULT_TTL_SECS, DEFAULT_UTC_OFFSET_SECS, SessionConfig, StorageKeys, SystemClock,
};
use elecscore_store::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElecscoreConfig {
    pub store: Option<StoreSection>,
    pub session: Option<SessionSection>,
    pub clock: Option<ClockSection>,
    pub logging: Option<LoggingSection>,
}

impl ElecscoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections are replaced whole, not field by field.
    pub fn merge(&mut self, other: ElecscoreConfig) {
        if other.store.is_some() {
            self.store = other.store;
        }
        if other.session.is_some() {
            self.session = other.session;
        }
        if other.clock.is_some() {
            self.clock = other.clock;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    pub fn store(&self) -> StoreSection {
        self.store.clone().unwrap_or_default()
    }

    pub fn session(&self) -> SessionSection {
        self.session.clone().unwrap_or_default()
    }

    pub fn clock(&self) -> ClockSection {
        self.clock.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingSection {
        self.logging.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// Persistent store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Database file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
    /// Key namespace inside the database.
    pub namespace: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Session table and validation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    pub ttl_secs: u32,
    /// Most sessions kept before the oldest is evicted. Unset means no cap;
    /// `0` is raised to `1`.
    pub max_sessions: Option<usize>,
    pub rescan_after_evict: bool,
    /// Also require the cookie to carry the client's own token.
    pub require_token_match: bool,
    pub count_key: String,
    pub token_prefix: String,
    pub time_prefix: String,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_sessions: None,
            rescan_after_evict: false,
            require_token_match: false,
            count_key: DEFAULT_COUNT_KEY.to_string(),
            token_prefix: DEFAULT_TOKEN_PREFIX.to_string(),
            time_prefix: DEFAULT_TIME_PREFIX.to_string(),
        }
    }
}

impl SessionSection {
    pub fn to_session_config(&self) -> SessionConfig {
        let config = SessionConfig::new()
            .with_ttl(self.ttl_secs)
            .with_keys(StorageKeys {
                count: self.count_key.clone(),
                token_prefix: self.token_prefix.clone(),
                time_prefix: self.time_prefix.clone(),
            })
            .with_rescan_after_evict(self.rescan_after_evict)
            .with_token_match(self.require_token_match);
        match self.max_sessions {
            Some(max) => config.with_max_sessions(max),
            None => config.without_max_sessions(),
        }
    }
}

/// Device clock settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSection {
    pub utc_offset_secs: i32,
    pub min_valid_year: i32,
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            utc_offset_secs: DEFAULT_UTC_OFFSET_SECS,
            min_valid_year: DEFAULT_MIN_VALID_YEAR,
        }
    }
}

impl ClockSection {
    pub fn to_clock(&self) -> SystemClock {
        SystemClock::new(self.utc_offset_secs, self.min_valid_year)
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Console filter level for elecscore crates.
    pub level: String,
    /// Directory for rotated JSON logs. Defaults to `<config dir>/logs`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ElecscoreConfig::from_toml("").unwrap();
        assert_eq!(config, ElecscoreConfig::default());
        assert_eq!(config.session().ttl_secs, 3600);
        assert_eq!(config.store().namespace, "elec-score");
        assert_eq!(config.clock().min_valid_year, 2016);
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config = ElecscoreConfig::from_toml(
            r#"
            [session]
            max_sessions = 16
            "#,
        )
        .unwrap();
        let session = config.session();
        assert_eq!(session.max_sessions, Some(16));
        assert_eq!(session.ttl_secs, 3600);
        assert!(!session.require_token_match);
        assert!(!session.to_session_config().require_token_match);
    }

    #[test]
    fn test_zero_session_cap_becomes_one() {
        let config = ElecscoreConfig::from_toml("[session]\nmax_sessions = 0\n").unwrap();
        assert_eq!(config.session().to_session_config().max_sessions, Some(1));
    }

    #[test]
    fn test_session_section_conversion() {
        let section = SessionSection {
            ttl_secs: 60,
            max_sessions: Some(0),
            token_prefix: "tok".to_string(),
            ..Default::default()
        };
        let config = section.to_session_config();
        assert_eq!(config.ttl, 60);
        assert_eq!(config.max_sessions, Some(1));
        assert_eq!(config.keys.token(3), "tok3");
        assert_eq!(config.keys.created_at(3), "sess-e3");
    }

    #[test]
    fn test_merge_replaces_sections() {
        let mut base = ElecscoreConfig::from_toml(
            r#"
            [session]
            ttl_secs = 100
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        let overlay = ElecscoreConfig::from_toml(
            r#"
            [session]
            ttl_secs = 200
            "#,
        )
        .unwrap();

        base.merge(overlay);
        assert_eq!(base.session().ttl_secs, 200);
        assert_eq!(base.logging().level, "debug");
    }

    #[test]
    fn test_toml_roundtrip_of_written_sections() {
        let mut config = ElecscoreConfig::new();
        config.clock = Some(ClockSection {
            utc_offset_secs: 7200,
            ..Default::default()
        });
        let text = config.to_toml().unwrap();
        assert_eq!(ElecscoreConfig::from_toml(&text).unwrap(), config);
    }
}
