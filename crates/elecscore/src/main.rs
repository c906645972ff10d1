//! elecscore - session administration for the electronic score device
//!
//! Main entry point for the elecscore CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{check, config, configure, login, sessions};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// elecscore - session administration for the electronic score device
#[derive(Parser)]
#[command(name = "elecscore")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Preferences database (overrides [store] path)
    #[arg(long, global = true, env = "ELECSCORE_DB")]
    pub db: Option<PathBuf>,

    /// User config directory (overrides ELECSCORE_CONFIG_DIR)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new session for a client and print its token
    Login(login::LoginArgs),

    /// Check whether a client holds a live session
    Check(check::CheckArgs),

    /// List, remove or sweep stored sessions
    Sessions(sessions::SessionsArgs),

    /// Apply an admin-page configuration request
    Configure(configure::ConfigureArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = elecscore_config::load_config_with_options(None, cli.config_dir.as_deref())?;
    let logging = loaded.config.logging();

    // Console layer on stderr, daily rotated JSON file layer in the log dir
    let level = if cli.verbose { "debug" } else { logging.level.as_str() };
    let filter = format!(
        "elecscore={level},elecscore_session={level},elecscore_store={level},elecscore_config={level},warn"
    );

    let log_dir = logging
        .dir
        .clone()
        .or_else(|| cli.config_dir.clone().map(|d| d.join("logs")))
        .or_else(|| elecscore_config::xdg_config_dir().map(|d| d.join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "elecscore.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "elecscore=trace,elecscore_session=trace,elecscore_store=trace,elecscore_config=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        db_override: cli.db,
        loaded,
    };

    match cli.command {
        Commands::Login(args) => login::run(args, &ctx),
        Commands::Check(args) => check::run(args, &ctx),
        Commands::Sessions(args) => sessions::run(args, &ctx),
        Commands::Configure(args) => configure::run(args, &ctx),
        Commands::Config(args) => config::run(args, &ctx),
    }
}
