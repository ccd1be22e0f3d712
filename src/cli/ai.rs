//! `agent-editor ai` command

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::{passthrough, Context};
use crate::output::{self, OutputFormat};
use crate::rpc::{
    call, methods, AiRunParams, NameRef, NoParams, ProviderKeyParams, ProviderSummary, ProviderTestParams,
};

const PROVIDER_TEST_PROMPT: &str = "hello";

#[derive(Args, Debug)]
pub struct AiArgs {
    #[command(subcommand)]
    pub command: AiCommands,
}

#[derive(Subcommand, Debug)]
pub enum AiCommands {
    /// Run a prompt against a document
    Run {
        /// Doc id or slug
        doc: String,

        /// Provider name
        #[arg(long, default_value = "local")]
        provider: String,

        /// Prompt text
        #[arg(long, default_value = "")]
        prompt: String,

        /// Anchor id
        #[arg(long, default_value = "")]
        anchor: String,
    },

    /// Manage AI providers
    Providers {
        #[command(subcommand)]
        command: ProviderCommands,
    },

    /// AI traces
    Traces {
        #[command(subcommand)]
        command: TraceCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProviderCommands {
    /// List providers
    List,
    /// Enable a provider
    Enable { name: String },
    /// Disable a provider
    Disable { name: String },
    /// Send a test prompt
    Test { name: String },
    /// Manage provider API keys
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Store an API key
    Set { name: String, key: String },
    /// Check whether a key is stored
    Has { name: String },
}

#[derive(Subcommand, Debug)]
pub enum TraceCommands {
    /// List recent traces
    List,
}

pub async fn execute(args: AiArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AiCommands::Run {
            doc,
            provider,
            prompt,
            anchor,
        } => {
            let params = AiRunParams {
                provider,
                doc_id: doc,
                anchor_id: anchor,
                prompt,
            };
            passthrough(ctx, methods::AI_RUN, &params).await
        }
        AiCommands::Providers { command } => providers(command, ctx).await,
        AiCommands::Traces {
            command: TraceCommands::List,
        } => traces_list(ctx.format()),
    }
}

async fn providers(command: ProviderCommands, ctx: &Context) -> Result<()> {
    match command {
        ProviderCommands::List => {
            let rpc = ctx.rpc()?;
            let rows: Vec<ProviderSummary> = call(rpc.as_ref(), methods::AI_PROVIDERS_LIST, &NoParams {}).await?;
            output::print_rows(&rows, ctx.format(), "No providers configured.")
        }
        ProviderCommands::Enable { name } => {
            passthrough(ctx, methods::AI_PROVIDERS_ENABLE, &NameRef { name: &name }).await
        }
        ProviderCommands::Disable { name } => {
            passthrough(ctx, methods::AI_PROVIDERS_DISABLE, &NameRef { name: &name }).await
        }
        ProviderCommands::Test { name } => {
            let params = ProviderTestParams {
                name: &name,
                prompt: PROVIDER_TEST_PROMPT,
            };
            passthrough(ctx, methods::AI_PROVIDER_TEST, &params).await
        }
        ProviderCommands::Key {
            command: KeyCommands::Set { name, key },
        } => {
            let params = ProviderKeyParams {
                name: &name,
                key: &key,
            };
            passthrough(ctx, methods::AI_PROVIDER_KEY_SET, &params).await
        }
        ProviderCommands::Key {
            command: KeyCommands::Has { name },
        } => passthrough(ctx, methods::AI_PROVIDER_KEY_GET, &NameRef { name: &name }).await,
    }
}

/// The sidecar has no trace listing method
fn traces_list(format: OutputFormat) -> Result<()> {
    let notice = "trace listing is not available from the server";
    match format {
        OutputFormat::Text => {
            println!("{}", notice.yellow());
            Ok(())
        }
        _ => output::print(notice, format),
    }
}
