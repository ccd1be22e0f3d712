//! `agent-editor export` command
//!
//! # Usage
//! ```bash
//! agent-editor export docs                               # print as json/yaml/text
//! agent-editor export docs --format jsonl --out docs.jsonl
//! agent-editor export docs --repo r1 --format tar --out notes.tar
//! agent-editor export db --out backup.sqlite
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand};

use super::{passthrough, Context};
use crate::export::{self, ExportDoc, ExportFormat};
use crate::output;
use crate::rpc::{call, methods, ExportDbParams, ExportDocsParams};

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub command: ExportCommands,
}

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export documents
    Docs(ExportDocsArgs),

    /// Back up the sidecar database
    Db {
        /// Destination path for the SQLite backup
        #[arg(long)]
        out: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ExportDocsArgs {
    /// Repo id to filter (default: all repos)
    #[arg(long)]
    pub repo: Option<String>,

    /// Include docs marked as deleted
    #[arg(long)]
    pub include_deleted: bool,

    /// Include version metadata (always on for tar)
    #[arg(long)]
    pub include_versions: bool,

    /// File format when writing with --out
    #[arg(long, value_enum, default_value_t = ExportFormat::Json, ignore_case = true)]
    pub format: ExportFormat,

    /// Write export to file (required for jsonl/tar)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl ExportDocsArgs {
    /// Check flag combinations and build the request
    pub fn params(&self) -> Result<ExportDocsParams> {
        if self.format.requires_destination() && self.out.is_none() {
            bail!("--out is required when format={}", self.format);
        }
        Ok(ExportDocsParams {
            repo_id: self.repo.clone().filter(|r| !r.is_empty()),
            include_deleted: self.include_deleted,
            include_versions: self.include_versions || self.format == ExportFormat::Tar,
        })
    }
}

pub async fn execute(args: ExportArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ExportCommands::Docs(docs) => export_docs(&docs, ctx).await,
        ExportCommands::Db { out } => {
            let Some(out) = out.filter(|o| !o.is_empty()) else {
                bail!("--out is required");
            };
            passthrough(ctx, methods::EXPORT_DB, &ExportDbParams { out_path: &out }).await
        }
    }
}

async fn export_docs(args: &ExportDocsArgs, ctx: &Context) -> Result<()> {
    let params = args.params()?;
    let rpc = ctx.rpc()?;
    let docs: Vec<ExportDoc> = call(rpc.as_ref(), methods::EXPORT_DOCS, &params).await?;

    let Some(out) = &args.out else {
        return output::print(&docs, ctx.format());
    };

    export::export_to_path(out, &docs, args.format)
        .with_context(|| format!("failed to write export to {}", out.display()))?;
    output::print_message(
        &format!(
            "exported {} docs to {} ({})",
            docs.len(),
            out.display(),
            args.format
        ),
        ctx.format(),
    )
}
