//! `agent-editor config` command
//!
//! # Usage
//! ```bash
//! agent-editor config show
//! agent-editor --config ./agent-editor.toml -o yaml config show
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use super::Context;
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (token masked)
    Show,
}

pub fn execute(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show(ctx),
    }
}

fn show(ctx: &Context) -> Result<()> {
    let shown = ctx.config.redacted();
    match ctx.format() {
        OutputFormat::Text => {
            println!("{}", "Configuration".bold());
            println!("  Server:  {}", shown.server.url.cyan());
            println!(
                "  Token:   {}",
                shown.server.token.as_deref().unwrap_or("(none)")
            );
            println!("  Timeout: {}s", shown.server.timeout_secs);
            println!("  Output:  {}", shown.output);
            Ok(())
        }
        format => output::print(&shown, format),
    }
}
