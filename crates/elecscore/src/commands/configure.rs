//! Configure command - apply an admin-page `key=value` request.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use elecscore_session::ConfigureError;
use tracing::warn;

use super::{Context, print_json};

/// Arguments for the configure command.
#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Config key (e.g. delSession)
    pub key: String,

    /// Value for the key
    pub value: Option<String>,
}

/// Run the configure command. Prints the result code the admin page expects.
pub fn run(args: ConfigureArgs, ctx: &Context) -> Result<ExitCode> {
    let services = ctx.open_services()?;

    let (code, exit) = match elecscore_session::configure(
        &services.admin,
        &args.key,
        args.value.as_deref(),
    ) {
        Ok(code) => (code, ExitCode::SUCCESS),
        Err(ConfigureError::Session(e)) => return Err(e.into()),
        Err(e) => {
            warn!(key = %args.key, "Config request rejected: {e}");
            (e.code(), ExitCode::FAILURE)
        }
    };

    if ctx.json_output {
        print_json(&serde_json::json!({ "result": code }))?;
    } else {
        println!("{code}");
    }
    Ok(exit)
}
