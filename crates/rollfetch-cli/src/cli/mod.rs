//! CLI for the rollfetch rolling-batch fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use rollfetch_core::config;
use std::path::PathBuf;

use commands::{run_completions, run_config, run_fetch, FetchArgs};

/// Top-level CLI for rollfetch.
#[derive(Debug, Parser)]
#[command(name = "rollfetch")]
#[command(about = "rollfetch: fetch many URLs with a bounded rolling window", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the XDG config path.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch URLs, keeping at most N requests in flight.
    Fetch {
        /// HTTP/HTTPS URLs to fetch.
        urls: Vec<String>,
        /// Also read URLs from FILE, one per line (`#` starts a comment).
        #[arg(long, short = 'i', value_name = "FILE")]
        input: Option<PathBuf>,
        /// Requests in flight at once (default from config).
        #[arg(long, short = 'n', value_name = "N")]
        limit: Option<usize>,
        /// Stop after SECS seconds; unfinished requests are dropped.
        #[arg(long, value_name = "SECS")]
        max_runtime: Option<f64>,
        /// Print one JSON object per completed request.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file path and the effective configuration.
    Config,

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        let cfg = match cli.config.as_deref() {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                urls,
                input,
                limit,
                max_runtime,
                json,
            } => {
                let args = FetchArgs {
                    urls,
                    input,
                    limit,
                    max_runtime,
                    json,
                };
                run_fetch(&cfg, &args)?;
            }
            CliCommand::Config => run_config(&cfg, cli.config.as_deref())?,
            CliCommand::Completions { shell } => run_completions(shell),
        }

        Ok(())
    }
}
