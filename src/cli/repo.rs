//! `agent-editor repo` command
//!
//! # Usage
//! ```bash
//! agent-editor repo add ~/notes --name notes --include '**/*.md'
//! agent-editor repo scan notes --watch
//! agent-editor repo list
//! agent-editor repo info notes
//! agent-editor repo remove notes
//! agent-editor repo default-provider set notes openrouter
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::{passthrough, Context};
use crate::output;
use crate::rpc::{
    call, methods, DefaultProviderParams, IdOrName, NoParams, RepoAddParams, RepoAdded, RepoRemoved,
    RepoSummary, ScanFilters, ScanParams, ScanReport,
};

#[derive(Args, Debug)]
pub struct RepoArgs {
    #[command(subcommand)]
    pub command: RepoCommands,
}

#[derive(Subcommand, Debug)]
pub enum RepoCommands {
    /// Register a repo path
    Add {
        path: String,

        /// Optional repo name
        #[arg(long, default_value = "")]
        name: String,

        /// Include globs
        #[arg(long)]
        include: Vec<String>,

        /// Exclude globs
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Scan and index a repo
    Scan {
        /// Repo path or name
        target: String,

        /// Include globs
        #[arg(long)]
        include: Vec<String>,

        /// Exclude globs
        #[arg(long)]
        exclude: Vec<String>,

        /// Watch for changes
        #[arg(long)]
        watch: bool,

        /// Debounce for watcher events, in milliseconds
        #[arg(long, default_value_t = 200)]
        debounce: u64,
    },

    /// List repos
    List,

    /// Show repo info
    Info {
        /// Repo id or name
        repo: String,
    },

    /// Unregister a repo
    Remove {
        /// Repo id or name
        repo: String,
    },

    /// Manage the repo's default AI provider
    DefaultProvider {
        #[command(subcommand)]
        command: DefaultProviderCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum DefaultProviderCommands {
    /// Set the default provider
    Set {
        /// Repo id or name
        repo: String,
        provider: String,
    },
}

/// Execute repo command
pub async fn execute(args: RepoArgs, ctx: &Context) -> Result<()> {
    match args.command {
        RepoCommands::Add {
            path,
            name,
            include,
            exclude,
        } => {
            let params = RepoAddParams {
                path,
                name,
                include,
                exclude,
            };
            add(ctx, &params).await
        }
        RepoCommands::Scan {
            target,
            include,
            exclude,
            watch,
            debounce,
        } => {
            let params = ScanParams {
                repo_path: target,
                filters: ScanFilters { include, exclude },
                watch,
                debounce,
            };
            scan(ctx, &params).await
        }
        RepoCommands::List => list(ctx).await,
        RepoCommands::Info { repo } => {
            passthrough(ctx, methods::REPOS_INFO, &IdOrName { id_or_name: &repo }).await
        }
        RepoCommands::Remove { repo } => remove(ctx, &repo).await,
        RepoCommands::DefaultProvider {
            command: DefaultProviderCommands::Set { repo, provider },
        } => {
            let params = DefaultProviderParams {
                id_or_name: &repo,
                provider: &provider,
            };
            passthrough(ctx, methods::REPOS_SET_DEFAULT_PROVIDER, &params).await
        }
    }
}

async fn add(ctx: &Context, params: &RepoAddParams) -> Result<()> {
    let rpc = ctx.rpc()?;
    let added: RepoAdded = call(rpc.as_ref(), methods::REPOS_ADD, params).await?;
    output::print(&format!("repo added: {}", added.repo_id), ctx.format())
}

async fn scan(ctx: &Context, params: &ScanParams) -> Result<()> {
    let rpc = ctx.rpc()?;
    let report: ScanReport = call(rpc.as_ref(), methods::SCAN_REPO, params).await?;
    match ctx.format() {
        output::OutputFormat::Text => {
            println!("{} Scanned {}", "✓".green(), params.repo_path.cyan());
            println!("  Files scanned: {}", report.files_scanned);
            println!("  Docs added:    {}", report.docs_added);
            if report.errors > 0 {
                println!("  Errors:        {}", report.errors.to_string().red());
            }
            if !report.job_id.is_empty() {
                println!("  Job:           {}", report.job_id.dimmed());
            }
            Ok(())
        }
        format => output::print(&report, format),
    }
}

async fn list(ctx: &Context) -> Result<()> {
    let rpc = ctx.rpc()?;
    let repos: Vec<RepoSummary> = call(rpc.as_ref(), methods::REPOS_LIST, &NoParams {}).await?;
    output::print_rows(&repos, ctx.format(), "No repos registered.")
}

async fn remove(ctx: &Context, repo: &str) -> Result<()> {
    if !ctx.confirm(&format!("Remove repo '{}'?", repo))? {
        println!("Cancelled.");
        return Ok(());
    }
    let rpc = ctx.rpc()?;
    let removed: RepoRemoved = call(rpc.as_ref(), methods::REPOS_REMOVE, &IdOrName { id_or_name: repo }).await?;
    output::print(&format!("removed: {}", removed.removed), ctx.format())
}
