//! `agent-editor fts` command
//!
//! Query, index stats, and a small latency benchmark over `search`.

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;

use super::{doc, passthrough, Context};
use crate::output;
use crate::rpc::{call, methods, NoParams, SearchParams};

const QUERY_LIMIT: u32 = 50;

#[derive(Args, Debug)]
pub struct FtsArgs {
    #[command(subcommand)]
    pub command: FtsCommands,
}

#[derive(Subcommand, Debug)]
pub enum FtsCommands {
    /// Run a full-text query
    Query { query: String },

    /// Index statistics
    Stats,

    /// Benchmark search latency
    Bench {
        /// Query to test
        #[arg(long, default_value = "the")]
        query: String,

        /// Number of runs
        #[arg(long, default_value_t = 25)]
        n: usize,

        /// Repo scope
        #[arg(long)]
        repo: Option<String>,
    },
}

/// Latency summary, in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchReport {
    pub runs: usize,
    pub avg_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

impl BenchReport {
    pub fn from_samples(samples: &[Duration]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort();
        let total: Duration = sorted.iter().sum();
        let avg = if sorted.is_empty() {
            Duration::ZERO
        } else {
            total / sorted.len() as u32
        };

        Self {
            runs: sorted.len(),
            avg_ms: millis(avg),
            p50_ms: millis(percentile(&sorted, 0.50)),
            p95_ms: millis(percentile(&sorted, 0.95)),
            p99_ms: millis(percentile(&sorted, 0.99)),
        }
    }
}

/// Nearest-rank on an ascending slice: index `round(p * (n - 1))`
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let last = sorted.len() - 1;
    let idx = (p * last as f64).round() as usize;
    sorted[idx.min(last)]
}

fn millis(d: Duration) -> f64 {
    d.as_micros() as f64 / 1000.0
}

pub async fn execute(args: FtsArgs, ctx: &Context) -> Result<()> {
    match args.command {
        FtsCommands::Query { query } => {
            let params = SearchParams {
                repo_id: None,
                query,
                limit: QUERY_LIMIT,
                offset: 0,
            };
            doc::search(ctx, &params).await
        }
        FtsCommands::Stats => passthrough(ctx, methods::FTS_STATS, &NoParams {}).await,
        FtsCommands::Bench { query, n, repo } => {
            if n == 0 {
                bail!("--n must be at least 1");
            }
            let params = SearchParams {
                repo_id: repo,
                query,
                limit: QUERY_LIMIT,
                offset: 0,
            };
            let report = bench(ctx, &params, n).await?;
            output::print(&report, ctx.format())
        }
    }
}

async fn bench(ctx: &Context, params: &SearchParams, runs: usize) -> Result<BenchReport> {
    let rpc = ctx.rpc()?;
    let mut samples = Vec::with_capacity(runs);
    for run in 0..runs {
        let started = Instant::now();
        let _: Value = call(rpc.as_ref(), methods::SEARCH, params).await?;
        let took = started.elapsed();
        tracing::debug!(run, took_ms = millis(took), "bench search");
        samples.push(took);
    }
    Ok(BenchReport::from_samples(&samples))
}
