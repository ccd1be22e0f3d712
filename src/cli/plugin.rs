//! `agent-editor plugin` command
//!
//! # Usage
//! ```bash
//! agent-editor plugin list
//! agent-editor plugin start-core fmt --exec ./fmt-core -- --stdio
//! agent-editor plugin call-core fmt '{"method":"fmt","params":{}}'
//! agent-editor plugin perms set fmt --json '{"fs":{"read":true}}'
//! agent-editor plugin events tail --all
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use clap::{ArgAction, Args, Subcommand};
use serde_json::Value;

use super::{passthrough, Context};
use crate::output;
use crate::progress::LogTail;
use crate::rpc::{
    call, methods, CallCoreParams, CoreProcess, NameRef, NoParams, PluginPermsParams, PluginSummary,
    SpawnCoreParams,
};

const PLUGIN_LINE_MARKER: &str = "][plugin:";
const FOLLOW_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Args, Debug)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginCommands,
}

#[derive(Subcommand, Debug)]
pub enum PluginCommands {
    /// List installed plugins
    List,
    /// Show plugin details
    Info { name: String },
    /// Remove a plugin
    Remove { name: String },
    /// Enable a plugin
    Enable { name: String },
    /// Disable a plugin
    Disable { name: String },

    /// List running core plugins
    CoreList,

    /// Send one JSON-RPC line to a core plugin
    CallCore { name: String, line: String },

    /// Start a core plugin process
    StartCore {
        name: String,

        /// Executable path for the core plugin
        #[arg(long)]
        exec: String,

        /// Arguments passed to the executable
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Stop a core plugin process
    StopCore { name: String },

    /// Manage plugin permissions
    Perms {
        #[command(subcommand)]
        command: PermsCommands,
    },

    /// Plugin events
    Events {
        #[command(subcommand)]
        command: EventsCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum PermsCommands {
    /// Replace a plugin's permissions
    Set {
        name: String,

        /// Permissions JSON, e.g. {"core":{"call":true},"fs":{"read":true}}
        #[arg(long, default_value = "{}")]
        json: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum EventsCommands {
    /// Tail plugin log events from the sidecar log
    Tail(TailArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TailArgs {
    /// Path to sidecar log file
    #[arg(long, default_value = ".sidecar.log")]
    pub file: PathBuf,

    /// Keep streaming new lines (like tail -f)
    #[arg(long, action = ArgAction::Set, default_value_t = true, num_args = 0..=1, default_missing_value = "true")]
    pub follow: bool,

    /// Show all lines, not only [plugin:*] ones
    #[arg(long)]
    pub all: bool,

    /// Start from the beginning instead of the end
    #[arg(long)]
    pub from_beginning: bool,
}

pub async fn execute(args: PluginArgs, ctx: &Context) -> Result<()> {
    match args.command {
        PluginCommands::List => {
            let rpc = ctx.rpc()?;
            let rows: Vec<PluginSummary> = call(rpc.as_ref(), methods::PLUGINS_LIST, &NoParams {}).await?;
            output::print_rows(&rows, ctx.format(), "No plugins installed.")
        }
        PluginCommands::Info { name } => passthrough(ctx, methods::PLUGINS_INFO, &NameRef { name: &name }).await,
        PluginCommands::Remove { name } => {
            if !ctx.confirm(&format!("Remove plugin '{}'?", name))? {
                println!("Cancelled.");
                return Ok(());
            }
            passthrough(ctx, methods::PLUGINS_REMOVE, &NameRef { name: &name }).await
        }
        PluginCommands::Enable { name } => {
            passthrough(ctx, methods::PLUGINS_ENABLE, &NameRef { name: &name }).await
        }
        PluginCommands::Disable { name } => {
            passthrough(ctx, methods::PLUGINS_DISABLE, &NameRef { name: &name }).await
        }
        PluginCommands::CoreList => {
            let rpc = ctx.rpc()?;
            let rows: Vec<CoreProcess> =
                call(rpc.as_ref(), methods::PLUGINS_CORE_LIST, &NoParams {}).await?;
            output::print_rows(&rows, ctx.format(), "No core plugins running.")
        }
        PluginCommands::CallCore { name, line } => {
            let params = CallCoreParams {
                name: &name,
                line: &line,
            };
            passthrough(ctx, methods::PLUGINS_CALL_CORE, &params).await
        }
        PluginCommands::StartCore { name, exec, args } => {
            if exec.trim().is_empty() {
                bail!("--exec is required");
            }
            let params = SpawnCoreParams {
                name: &name,
                exec: &exec,
                args,
            };
            passthrough(ctx, methods::PLUGINS_SPAWN_CORE, &params).await
        }
        PluginCommands::StopCore { name } => {
            passthrough(ctx, methods::PLUGINS_SHUTDOWN_CORE, &NameRef { name: &name }).await
        }
        PluginCommands::Perms {
            command: PermsCommands::Set { name, json },
        } => {
            let permissions = normalize_permissions(&json)?;
            let params = PluginPermsParams {
                name: &name,
                permissions: &permissions,
            };
            passthrough(ctx, methods::PLUGINS_UPSERT, &params).await
        }
        PluginCommands::Events {
            command: EventsCommands::Tail(args),
        } => tail_events(&args).await,
    }
}

/// Permissions must be a JSON object. Returned compacted.
fn normalize_permissions(raw: &str) -> Result<String> {
    let raw = if raw.trim().is_empty() { "{}" } else { raw };
    let value: Value =
        serde_json::from_str(raw).with_context(|| format!("invalid --json permissions: {}", raw))?;
    if !value.is_object() {
        bail!("invalid --json permissions: expected a JSON object");
    }
    Ok(value.to_string())
}

fn is_plugin_line(line: &str) -> bool {
    line.contains(PLUGIN_LINE_MARKER)
}

fn wanted(line: &str, all: bool) -> bool {
    !line.trim().is_empty() && (all || is_plugin_line(line))
}

async fn open_tail(path: &Path, from_beginning: bool) -> Result<LogTail> {
    tokio::fs::metadata(path)
        .await
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    if from_beginning {
        Ok(LogTail::new(path))
    } else {
        Ok(LogTail::from_end(path).await?)
    }
}

async fn tail_events(args: &TailArgs) -> Result<()> {
    let mut tail = open_tail(&args.file, args.from_beginning).await?;
    tracing::debug!(path = %args.file.display(), offset = tail.offset(), follow = args.follow, "tailing plugin events");

    loop {
        for line in tail.poll().await? {
            if wanted(&line, args.all) {
                println!("{}", line);
            }
        }

        if !args.follow {
            if let Some(rest) = tail.take_remainder().filter(|l| wanted(l, args.all)) {
                println!("{}", rest);
            }
            return Ok(());
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = tokio::time::sleep(FOLLOW_INTERVAL) => {}
        }
    }
}
