//! Login command - record a session for a client.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use elecscore_session::session_cookie;

use super::{Context, print_json};

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Client identity (the browser's User-Agent)
    #[arg(long)]
    pub agent: String,
}

/// Run the login command.
pub fn run(args: LoginArgs, ctx: &Context) -> Result<ExitCode> {
    let services = ctx.open_services()?;
    let token = services.auth.create_session(&args.agent)?;
    let cookie = session_cookie(&token, services.auth.config().ttl);

    if ctx.json_output {
        print_json(&serde_json::json!({
            "token": token,
            "set_cookie": cookie,
        }))?;
    } else {
        println!("{token}");
        println!("Set-Cookie: {cookie}");
    }
    Ok(ExitCode::SUCCESS)
}
