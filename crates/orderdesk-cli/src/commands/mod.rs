mod clock;
mod order;

use std::process::ExitCode;

use orderdesk_core::DeskConfig;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let config = resolve_config(cli)?;

    match &cli.command {
        Command::Order(args) => order::run(args, config, cli.format).await,
        Command::Clock(args) => clock::run(args, config, cli.format).await,
    }
}

/// Environment first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<DeskConfig, CliError> {
    let mut config = DeskConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }
    Ok(config)
}
