//! Config command - inspect the resolved configuration.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, print_json};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the merged configuration
    Show,

    /// Show config file locations and the database path
    Path,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<ExitCode> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

fn cmd_show(ctx: &Context) -> Result<ExitCode> {
    let config = &ctx.loaded.config;
    if ctx.json_output {
        print_json(config)?;
    } else {
        let text = config.to_toml()?;
        if text.trim().is_empty() {
            println!("# no configuration files loaded, using defaults");
        } else {
            print!("{text}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_path(ctx: &Context) -> Result<ExitCode> {
    let db = ctx.db_path()?;

    if ctx.json_output {
        let sources: Vec<_> = ctx
            .loaded
            .sources
            .iter()
            .map(|s| serde_json::json!({ "path": s.path, "loaded": s.loaded }))
            .collect();
        print_json(&serde_json::json!({ "sources": sources, "database": db }))?;
        return Ok(ExitCode::SUCCESS);
    }

    for source in &ctx.loaded.sources {
        let status = if source.loaded { "loaded" } else { "not found" };
        println!("{} ({status})", source.path.display());
    }
    println!("database: {}", db.display());
    Ok(ExitCode::SUCCESS)
}
