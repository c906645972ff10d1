//! Check command - validate a client's credential.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use super::{Context, print_json};

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Client identity (the browser's User-Agent)
    #[arg(long)]
    pub agent: Option<String>,

    /// Session token presented by the client
    #[arg(long, conflicts_with = "cookie")]
    pub token: Option<String>,

    /// Raw Cookie header presented by the client
    #[arg(long)]
    pub cookie: Option<String>,
}

/// Run the check command. Exits non-zero when the client is not authenticated.
pub fn run(args: CheckArgs, ctx: &Context) -> Result<ExitCode> {
    let services = ctx.open_services()?;

    let authenticated = match (&args.cookie, &args.agent) {
        (Some(cookie), agent) => services
            .auth
            .check_request(Some(cookie.as_str()), agent.as_deref())?,
        (None, Some(agent)) => services.auth.validate(agent, args.token.as_deref())?,
        (None, None) => false,
    };

    if ctx.json_output {
        print_json(&serde_json::json!({ "authenticated": authenticated }))?;
    } else if authenticated {
        println!("authenticated");
    } else {
        println!("unauthenticated");
    }

    Ok(if authenticated {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
