//! CLI module - Command definitions and handlers
//!
//! Each command group lives in its own module with clap `Args` and an
//! `execute` entry point. Handlers talk to the sidecar only through
//! [`RpcTransport`], handed out by [`Context`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, Overrides};
use crate::output::{self, OutputFormat};
use crate::rpc::{call, RpcClient, RpcTransport};

pub mod ai;
pub mod config;
pub mod doc;
pub mod export;
pub mod fts;
pub mod graph;
pub mod import;
pub mod plugin;
pub mod repo;
pub mod settings;
pub mod version;

/// agent-editor - Local-first Markdown knowledge system
///
/// Talks to a running agent-editor sidecar over JSON-RPC.
#[derive(Parser, Debug)]
#[command(name = "agent-editor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Output format
    #[arg(short, long, global = true, value_enum, env = "AGENT_EDITOR_OUTPUT")]
    pub output: Option<OutputFormat>,

    /// Sidecar base URL [default: http://127.0.0.1:35678]
    #[arg(long, global = true, env = "AGENT_EDITOR_SERVER")]
    pub server: Option<String>,

    /// API token
    #[arg(long, global = true, env = "AGENT_EDITOR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Per-call timeout in seconds [default: 30]
    #[arg(
        long,
        global = true,
        env = "AGENT_EDITOR_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Config file (TOML)
    #[arg(long, global = true, env = "AGENT_EDITOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Trace-level logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Assume yes for prompts
    #[arg(long, global = true)]
    pub yes: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            server: self.server.clone(),
            token: self.token.clone(),
            timeout_secs: self.timeout,
            output: self.output,
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            return "trace";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage repositories
    Repo(repo::RepoArgs),

    /// Document operations
    Doc(doc::DocArgs),

    /// Link graph operations
    Graph(graph::GraphArgs),

    /// Full-text search operations
    Fts(fts::FtsArgs),

    /// AI operations
    Ai(ai::AiArgs),

    /// Plugin management
    Plugin(plugin::PluginArgs),

    /// Import archives
    Import(import::ImportArgs),

    /// Export data
    Export(export::ExportArgs),

    /// App settings
    Settings(settings::SettingsArgs),

    /// Show the effective CLI configuration
    Config(config::ConfigArgs),

    /// Show version information
    Version,
}

/// Everything a command handler needs besides its own arguments
pub struct Context {
    pub config: Config,
    pub assume_yes: bool,
    transport: Option<Arc<dyn RpcTransport>>,
}

impl Context {
    pub fn new(config: Config, assume_yes: bool) -> Self {
        Self {
            config,
            assume_yes,
            transport: None,
        }
    }

    /// Use `transport` instead of an HTTP client built from the config
    pub fn with_transport(mut self, transport: Arc<dyn RpcTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.config.output
    }

    /// Transport for remote calls. Building it does not touch the network.
    pub fn rpc(&self) -> Result<Arc<dyn RpcTransport>> {
        match &self.transport {
            Some(transport) => Ok(Arc::clone(transport)),
            None => Ok(Arc::new(RpcClient::from_config(&self.config.server)?)),
        }
    }

    /// Ask before doing something destructive; `--yes` skips the prompt
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let answer = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Run a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.global.config.as_deref(), &cli.global.overrides())?;
    tracing::debug!(server = %config.server.url, output = %config.output, "config loaded");
    let ctx = Context::new(config, cli.global.yes);

    match cli.command {
        Commands::Repo(args) => repo::execute(args, &ctx).await,
        Commands::Doc(args) => doc::execute(args, &ctx).await,
        Commands::Graph(args) => graph::execute(args, &ctx).await,
        Commands::Fts(args) => fts::execute(args, &ctx).await,
        Commands::Ai(args) => ai::execute(args, &ctx).await,
        Commands::Plugin(args) => plugin::execute(args, &ctx).await,
        Commands::Import(args) => import::execute(args, &ctx).await,
        Commands::Export(args) => export::execute(args, &ctx).await,
        Commands::Settings(args) => settings::execute(args, &ctx).await,
        Commands::Config(args) => config::execute(args, &ctx),
        Commands::Version => version::execute(&ctx),
    }
}

/// Call `method` and print whatever comes back
pub(crate) async fn passthrough<P>(ctx: &Context, method: &str, params: &P) -> Result<()>
where
    P: Serialize + ?Sized,
{
    let rpc = ctx.rpc()?;
    let value: Value = call(rpc.as_ref(), method, params).await?;
    output::print(&value, ctx.format())
}
