//! `agent-editor doc` command

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{passthrough, Context};
use crate::output;
use crate::rpc::{
    call, methods, DocCreateParams, DocCreated, DocDeleted, DocGetParams, DocRef, DocUpdateParams,
    DocUpdated, SearchHit, SearchParams,
};

#[derive(Args, Debug)]
pub struct DocArgs {
    #[command(subcommand)]
    pub command: DocCommands,
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Create a document
    Create {
        /// Repo id
        repo: String,
        slug: String,

        /// Document title
        #[arg(long, default_value = "")]
        title: String,

        /// Initial body text
        #[arg(long, default_value = "")]
        body: String,
    },

    /// Write a new version of a document
    Update {
        /// Doc id or slug
        doc: String,

        /// Body text
        #[arg(long, default_value = "")]
        body: String,

        /// Commit message
        #[arg(long, default_value = "")]
        message: String,
    },

    /// Show a document
    Get {
        /// Doc id or slug
        doc: String,

        /// Include content body
        #[arg(long)]
        content: bool,
    },

    /// Delete a document
    Delete {
        /// Doc id or slug
        doc: String,
    },

    /// Full-text search
    Search {
        query: String,

        /// Repo scope
        #[arg(long)]
        repo: Option<String>,

        #[arg(long, default_value_t = 50)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
}

pub async fn execute(args: DocArgs, ctx: &Context) -> Result<()> {
    let format = ctx.format();
    match args.command {
        DocCommands::Create {
            repo,
            slug,
            title,
            body,
        } => {
            let params = DocCreateParams {
                repo_id: repo,
                slug,
                title,
                body,
            };
            let rpc = ctx.rpc()?;
            let created: DocCreated = call(rpc.as_ref(), methods::DOCS_CREATE, &params).await?;
            output::print(&format!("doc created: {}", created.doc_id), format)
        }
        DocCommands::Update { doc, body, message } => {
            let params = DocUpdateParams {
                doc_id: doc,
                body,
                message,
            };
            let rpc = ctx.rpc()?;
            let updated: DocUpdated = call(rpc.as_ref(), methods::DOCS_UPDATE, &params).await?;
            output::print(&format!("version: {}", updated.version_id), format)
        }
        DocCommands::Get { doc, content } => {
            let params = DocGetParams {
                doc_id: &doc,
                content,
            };
            passthrough(ctx, methods::DOCS_GET, &params).await
        }
        DocCommands::Delete { doc } => {
            if !ctx.confirm(&format!("Delete doc '{}'?", doc))? {
                println!("Cancelled.");
                return Ok(());
            }
            let rpc = ctx.rpc()?;
            let deleted: DocDeleted = call(rpc.as_ref(), methods::DOCS_DELETE, &DocRef { doc_id: &doc }).await?;
            output::print(&format!("deleted: {}", deleted.deleted), format)
        }
        DocCommands::Search {
            query,
            repo,
            limit,
            offset,
        } => {
            let params = SearchParams {
                repo_id: repo,
                query,
                limit,
                offset,
            };
            search(ctx, &params).await
        }
    }
}

/// Run one `search` call and print the hits
pub(crate) async fn search(ctx: &Context, params: &SearchParams) -> Result<()> {
    let rpc = ctx.rpc()?;
    let hits: Vec<SearchHit> = call(rpc.as_ref(), methods::SEARCH, params).await?;
    output::print_rows(&hits, ctx.format(), "No matches.")
}
