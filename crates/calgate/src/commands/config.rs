//! Config command - configuration inspection.

use anyhow::Result;
use clap::{Args, Subcommand};

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets redacted (default)
    Show,

    /// Fail if any OAuth variable is missing
    Check,
}

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => {
            println!("{}", ctx.settings);
            Ok(())
        }
        ConfigCommand::Check => {
            let missing = ctx.settings.oauth_missing();
            if missing.is_empty() {
                println!("OAuth configuration complete");
                Ok(())
            } else {
                anyhow::bail!("missing OAuth configuration: {}", missing.join(", "))
            }
        }
    }
}
