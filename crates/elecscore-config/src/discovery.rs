//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/elecscore/config.toml` (user config)
//! 2. `./elecscore.toml` (project-local)
//! 3. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{ConfigError, ElecscoreConfig, Result};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "elecscore.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for platform directory resolution.
const APP_NAME: &str = "elecscore";

/// Default database filename within the data directory.
const DB_FILE: &str = "prefs.db";

/// Environment variable to override the config directory.
pub const CONFIG_DIR_ENV: &str = "ELECSCORE_CONFIG_DIR";

/// Where a config layer was looked for.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: ElecscoreConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
}

impl LoadedConfig {
    /// Paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
///
/// `project_dir` defaults to the working directory. `config_dir` overrides
/// both `ELECSCORE_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = ElecscoreConfig::new();
    let mut sources = Vec::new();

    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => xdg_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path)?);
    }

    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path)?);

    Ok(LoadedConfig { config, sources })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<ElecscoreConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    ElecscoreConfig::from_toml(&contents)
}

fn load_layer(config: &mut ElecscoreConfig, path: &Path) -> Result<ConfigSource> {
    if !path.exists() {
        return Ok(ConfigSource {
            path: path.to_path_buf(),
            loaded: false,
        });
    }

    let layer = load_config_file(path)?;
    debug!(path = %path.display(), "Loaded config layer");
    config.merge(layer);
    Ok(ConfigSource {
        path: path.to_path_buf(),
        loaded: true,
    })
}

/// User config directory: `$ELECSCORE_CONFIG_DIR`, else the platform config dir.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Path of the user config file.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Database path used when `[store] path` is not set.
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join(APP_NAME).join(DB_FILE))
}
