//! `agent-editor graph` command

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use super::{passthrough, Context};
use crate::output;
use crate::rpc::{call, methods, DocRef, NeighborsParams, PathParams};

const MAX_DEPTH: u8 = 2;

#[derive(Args, Debug)]
pub struct GraphArgs {
    #[command(subcommand)]
    pub command: GraphCommands,
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Docs linked to or from a doc
    Neighbors {
        doc: String,

        /// Depth (1..2)
        #[arg(long, default_value_t = 1)]
        depth: u8,
    },

    /// Docs linking to a doc
    Backlinks { doc: String },

    /// Shortest link path between two docs
    Path { start: String, end: String },

    /// Docs related to a doc
    Related { doc: String },
}

pub async fn execute(args: GraphArgs, ctx: &Context) -> Result<()> {
    match args.command {
        GraphCommands::Neighbors { doc, depth } => {
            if !(1..=MAX_DEPTH).contains(&depth) {
                bail!("invalid --depth {} (expected 1..{})", depth, MAX_DEPTH);
            }
            let params = NeighborsParams { doc_id: &doc, depth };
            passthrough(ctx, methods::GRAPH_NEIGHBORS, &params).await
        }
        GraphCommands::Backlinks { doc } => {
            passthrough(ctx, methods::GRAPH_BACKLINKS, &DocRef { doc_id: &doc }).await
        }
        GraphCommands::Path { start, end } => {
            let params = PathParams {
                start_id: &start,
                end_id: &end,
            };
            let rpc = ctx.rpc()?;
            let hops: Vec<String> = call(rpc.as_ref(), methods::GRAPH_PATH, &params).await?;
            output::print(&hops, ctx.format())
        }
        GraphCommands::Related { doc } => {
            passthrough(ctx, methods::GRAPH_RELATED, &DocRef { doc_id: &doc }).await
        }
    }
}
