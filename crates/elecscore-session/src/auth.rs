//! Request authentication against the session table.
//!
//! A client is identified by a string it declares on every request (the
//! browser's `User-Agent`). Logging in stores the hash of that string as a
//! session token and hands the same token back to be kept as a cookie.
//! Validation hashes the declared identity again and scans the table for it.
//!
//! Expired sessions are evicted as a side effect of validation. While the
//! clock is unavailable nothing expires: authentication still requires a
//! matching session, only the age check is skipped.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, DeviceTime};
use crate::config::SessionConfig;
use crate::cookie::session_id_from_cookie;
use crate::error::Result;
use crate::hash::TokenHasher;
use crate::table::SharedTable;

/// Compare two strings in constant time.
///
/// Unequal lengths still run a comparison so that timing does not reveal
/// how much of the token matched.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    if a_bytes.len() == b_bytes.len() {
        a_bytes.ct_eq(b_bytes).into()
    } else {
        let _ = a_bytes.ct_eq(a_bytes);
        false
    }
}

/// Validates presented credentials and records new sessions.
pub struct Authenticator {
    table: SharedTable,
    clock: Arc<dyn Clock>,
    hasher: Arc<dyn TokenHasher>,
    config: SessionConfig,
}

impl Authenticator {
    pub fn new(
        table: SharedTable,
        clock: Arc<dyn Clock>,
        hasher: Arc<dyn TokenHasher>,
        config: SessionConfig,
    ) -> Self {
        Self {
            table,
            clock,
            hasher,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn table(&self) -> &SharedTable {
        &self.table
    }

    /// Check whether `identity` holds a live session.
    ///
    /// Returns `Ok(false)` when no token is presented or no live session
    /// matches. An expired match is removed from the table and the scan
    /// continues past it.
    pub fn validate(&self, identity: &str, presented: Option<&str>) -> Result<bool> {
        let Some(presented) = presented.filter(|t| !t.is_empty()) else {
            debug!("No session token presented");
            return Ok(false);
        };

        let agent_hash = self.hasher.digest(identity.as_bytes());
        if self.config.require_token_match && !constant_time_eq(presented, &agent_hash) {
            debug!("Presented token does not belong to this client");
            return Ok(false);
        }

        let now = self.clock.device_time();
        if now.is_none() {
            error!("Could not read device time, sessions will not expire");
        }

        let mut table = self.table.lock();
        table.atomically(|table| {
            let mut count = table.len()?;
            let mut slot = 0;
            debug!(count, "Scanning sessions");

            while slot < count {
                let record = table.get(slot)?;

                if record.token.is_empty() {
                    debug!(slot, "Empty session slot, skipping");
                    slot += 1;
                    continue;
                }

                if !constant_time_eq(&record.token, &agent_hash) {
                    slot += 1;
                    continue;
                }

                let Some(now) = now else {
                    debug!(slot, "Session matched, expiration disabled");
                    return Ok(true);
                };

                let age = now.age_since(record.created_at);
                if age > self.config.ttl {
                    info!(slot, age, ttl = self.config.ttl, "Session expired, removing");
                    table.remove_at(slot)?;
                    count -= 1;
                    if !self.config.rescan_after_evict {
                        slot += 1;
                    }
                    continue;
                }

                debug!(slot, age, "Session valid");
                return Ok(true);
            }

            debug!("No live session matched");
            Ok(false)
        })
    }

    /// Check a request given its raw `Cookie` and `User-Agent` header values.
    pub fn check_request(&self, cookie_header: Option<&str>, user_agent: Option<&str>) -> Result<bool> {
        let Some(token) = cookie_header.and_then(session_id_from_cookie) else {
            debug!("Request carries no session cookie");
            return Ok(false);
        };
        let Some(user_agent) = user_agent else {
            debug!("Request carries no user agent");
            return Ok(false);
        };
        self.validate(user_agent, Some(token))
    }

    /// Record a new session for `identity` and return its token.
    ///
    /// Logging in twice with the same identity stores two records with the
    /// same token; each expires on its own.
    pub fn create_session(&self, identity: &str) -> Result<String> {
        let token = self.hasher.digest(identity.as_bytes());
        let created_at = self.clock.device_time().unwrap_or_else(|| {
            warn!("Could not read device time, session will expire on first timed check");
            DeviceTime::UNSET
        });

        let mut table = self.table.lock();
        let slot = table.atomically(|table| {
            if let Some(max) = self.config.max_sessions {
                while table.len()? >= max {
                    let evicted = table.remove_at(0)?;
                    info!(created_at = %evicted.created_at, max, "Session table full, evicted oldest session");
                }
            }
            table.append(&token, created_at)
        })?;

        info!(slot, created_at = %created_at, "Session created");
        Ok(token)
    }

    /// Remove every expired session in one pass and return how many went.
    ///
    /// Does nothing while the clock is unavailable.
    pub fn sweep_expired(&self) -> Result<usize> {
        let Some(now) = self.clock.device_time() else {
            warn!("Could not read device time, skipping session sweep");
            return Ok(0);
        };

        let mut table = self.table.lock();
        let (removed, remaining) = table.atomically(|table| {
            let mut count = table.len()?;
            let mut slot = 0;
            let mut removed = 0;

            while slot < count {
                let record = table.get(slot)?;
                if !record.token.is_empty() && now.age_since(record.created_at) > self.config.ttl {
                    table.remove_at(slot)?;
                    count -= 1;
                    removed += 1;
                } else {
                    slot += 1;
                }
            }
            Ok((removed, count))
        })?;

        if removed > 0 {
            info!(removed, remaining, "Swept expired sessions");
        }
        Ok(removed)
    }
}
