//! CLI for the chunkzip worker and download client.

mod commands;

use anyhow::Result;
use chunkzip_core::config;
use chunkzip_core::logging::LogRole;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_checksum, run_download, run_purge, run_serve};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "chunkzip")]
#[command(about = "Assemble remotely listed packages into zip archives, chunk by chunk", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the worker HTTP surface (`/generate-zip/{slug}`).
    Serve {
        /// Address to bind, overriding `worker.listen_addr`.
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Download a package through a worker into `{dir}/{slug}.zip`.
    Download {
        /// Package slug to download.
        slug: String,

        /// Worker base URL (else $WORKER_URL, else config, else http://localhost:8787).
        #[arg(short = 'w', long = "worker-url", value_name = "URL")]
        worker_url: Option<String>,

        /// Output directory (default: `downloads`).
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file (e.g. a downloaded archive).
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Delete leftover intermediate records of an abandoned run from the worker store.
    Purge {
        /// Package slug whose records to delete.
        slug: String,
    },
}

impl CliCommand {
    /// `serve` logs as the worker; everything else as the client.
    pub fn log_role(&self) -> LogRole {
        match self {
            CliCommand::Serve { .. } => LogRole::Worker,
            _ => LogRole::Client,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Serve { listen } => run_serve(&cfg, listen).await?,
            CliCommand::Download {
                slug,
                worker_url,
                output_dir,
            } => run_download(&cfg, &slug, worker_url.as_deref(), output_dir).await?,
            CliCommand::Checksum { path } => run_checksum(&path).await?,
            CliCommand::Purge { slug } => run_purge(&cfg, &slug).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
