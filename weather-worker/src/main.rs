//! Binary crate hosting the weather lookup worker.
//!
//! This crate focuses on:
//! - Loading configuration and installing logging
//! - Spawning the transaction loop on the tokio runtime
//! - Turning lines read from standard input into city triggers

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = cli::Args::parse();
    args.run().await
}
