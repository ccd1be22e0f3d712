//! `agent-editor settings` command

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{passthrough, Context};
use crate::rpc::{methods, SettingsGetParams, SettingsSetParams, DEFAULT_PROVIDER_KEY};

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommands,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Global default AI provider
    DefaultProvider {
        #[command(subcommand)]
        command: DefaultProviderCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum DefaultProviderCommands {
    /// Show the default provider
    Get,
    /// Set the default provider
    Set { provider: String },
}

pub async fn execute(args: SettingsArgs, ctx: &Context) -> Result<()> {
    let SettingsCommands::DefaultProvider { command } = args.command;
    match command {
        DefaultProviderCommands::Get => {
            let params = SettingsGetParams {
                key: DEFAULT_PROVIDER_KEY,
            };
            passthrough(ctx, methods::APP_SETTINGS_GET, &params).await
        }
        DefaultProviderCommands::Set { provider } => {
            let params = SettingsSetParams {
                key: DEFAULT_PROVIDER_KEY,
                value: &provider,
            };
            passthrough(ctx, methods::APP_SETTINGS_SET, &params).await
        }
    }
}
