//! Sessions command - inspect and prune the session table.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, print_json};

/// Arguments for the sessions command.
#[derive(Args, Debug)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SessionsCommand {
    /// List stored sessions in slot order
    List,

    /// Remove the session at a slot index
    Remove {
        /// Slot index as shown by `sessions list`
        index: usize,
    },

    /// Remove every expired session
    Sweep,
}

/// Run the sessions command.
pub fn run(args: SessionsArgs, ctx: &Context) -> Result<ExitCode> {
    match args.command {
        SessionsCommand::List => cmd_list(ctx),
        SessionsCommand::Remove { index } => cmd_remove(index, ctx),
        SessionsCommand::Sweep => cmd_sweep(ctx),
    }
}

fn cmd_list(ctx: &Context) -> Result<ExitCode> {
    let services = ctx.open_services()?;
    let records = services.admin.list()?;

    if ctx.json_output {
        print_json(&records)?;
        return Ok(ExitCode::SUCCESS);
    }

    if records.is_empty() {
        println!("No sessions.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:<6} {:<12} TOKEN", "SLOT", "CREATED");
    for record in &records {
        let token = if ctx.verbose {
            record.token.as_str()
        } else {
            record.token.get(..16).unwrap_or(record.token.as_str())
        };
        println!("{:<6} {:<12} {}", record.slot, record.created_at, token);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_remove(index: usize, ctx: &Context) -> Result<ExitCode> {
    let services = ctx.open_services()?;
    let removed = services.admin.remove_by_index(index)?;

    if ctx.json_output {
        print_json(&removed)?;
    } else {
        println!("Removed session {index}");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_sweep(ctx: &Context) -> Result<ExitCode> {
    let services = ctx.open_services()?;
    let removed = services.auth.sweep_expired()?;

    if ctx.json_output {
        print_json(&serde_json::json!({ "removed": removed }))?;
    } else {
        println!("Removed {removed} expired session(s)");
    }
    Ok(ExitCode::SUCCESS)
}
