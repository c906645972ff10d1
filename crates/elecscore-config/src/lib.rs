//! Configuration system for elecscore.
//!
//! Provides TOML-based configuration with:
//! - `[store]`, `[session]`, `[clock]` and `[logging]` sections, all optional
//! - Config file layering (user config dir + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    CONFIG_DIR_ENV, ConfigSource, LoadedConfig, default_db_path, load_config_file,
    load_config_with_options, xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
