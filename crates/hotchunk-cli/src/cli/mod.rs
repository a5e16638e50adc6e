//! CLI for the hotchunk runtime.

mod commands;


use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hotchunk_core::config::{self, RuntimeConfig};

use commands::{run_check, run_fetch, run_watch};

/// Top-level CLI for the hotchunk chunk-loading runtime.
#[derive(Debug, Parser)]
#[command(name = "hotchunk")]
#[command(about = "hotchunk: on-demand chunk loading and hot-update client", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG default.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured public path.
    #[arg(long, global = true, value_name = "URL")]
    pub public_path: Option<String>,

    /// Override the configured build hash.
    #[arg(long, global = true, value_name = "HASH")]
    pub build_hash: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch one chunk and list the modules it delivered.
    Fetch {
        /// Chunk id (numeric index or name).
        chunk: String,
    },

    /// Check once whether a hot update is available.
    Check,

    /// Poll for hot updates and apply them as they appear.
    Watch {
        /// Override the poll interval in seconds.
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
}

/// Parses the command line and runs the selected command.
pub async fn run_from_args() -> Result<()> {
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    match cli.command {
        CliCommand::Fetch { chunk } => run_fetch(&cfg, &chunk).await,
        CliCommand::Check => run_check(&cfg).await,
        CliCommand::Watch { interval } => run_watch(&cfg, interval).await,
    }
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load_or_init()?,
    };
    if let Some(public_path) = &cli.public_path {
        cfg.public_path = public_path.clone();
    }
    if let Some(build_hash) = &cli.build_hash {
        cfg.build_hash = build_hash.clone();
    }
    Ok(cfg)
}
