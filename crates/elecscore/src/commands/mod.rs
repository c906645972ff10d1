//! CLI command handlers.

pub mod check;
pub mod config;
pub mod configure;
pub mod login;
pub mod sessions;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use elecscore_config::LoadedConfig;
use elecscore_session::{Authenticator, SessionAdmin, SessionTable, Sha256Hasher};
use elecscore_store::SqliteStore;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Database path given on the command line.
    pub db_override: Option<PathBuf>,
    /// Merged configuration and where it came from.
    pub loaded: LoadedConfig,
}

impl Context {
    /// Database path: `--db`, then `[store] path`, then the platform default.
    pub fn db_path(&self) -> Result<PathBuf> {
        self.db_override
            .clone()
            .or_else(|| self.loaded.config.store().path)
            .or_else(elecscore_config::default_db_path)
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    /// Open the store and wire the session services over it.
    pub fn open_services(&self) -> Result<Services> {
        let path = self.db_path()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let store_config = self.loaded.config.store();
        let store = SqliteStore::open(&path, &store_config.namespace)
            .with_context(|| format!("Failed to open preferences at {}", path.display()))?;

        let session_config = self.loaded.config.session().to_session_config();
        let table = SessionTable::new(Arc::new(store), session_config.keys.clone()).into_shared();
        let clock = Arc::new(self.loaded.config.clock().to_clock());

        Ok(Services {
            auth: Authenticator::new(table.clone(), clock, Arc::new(Sha256Hasher), session_config),
            admin: SessionAdmin::new(table),
        })
    }
}

/// Session services backed by the configured store.
pub struct Services {
    pub auth: Authenticator,
    pub admin: SessionAdmin,
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
