use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use weather_core::{
    ConsoleDisplay, Delivery, DisplaySink, NullDisplay, TcpTransport, TransactionLoop,
    TriggerError, WorkerConfig,
};

/// Worker options. Triggers arrive as city names, one per line on stdin.
#[derive(Debug, Parser)]
#[command(name = "weather-worker", version, about = "Weatherstack lookup worker")]
pub struct Args {
    /// Config file; defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run without a display: readings are only logged.
    #[arg(long)]
    pub no_display: bool,
}

impl Args {
    pub async fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => WorkerConfig::load_from(path)?,
            None => WorkerConfig::load()?,
        };

        let display: Box<dyn DisplaySink> = if self.no_display {
            Box::new(NullDisplay)
        } else {
            Box::new(ConsoleDisplay::stdout())
        };
        let transport = TcpTransport::new(config.io_timeout());

        let (worker, triggers, _status) = TransactionLoop::new(&config, transport, display);
        let task = tokio::spawn(worker.run());

        info!("Enter a city name to request its weather");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read trigger from stdin")? else {
                        break;
                    };
                    match triggers.fire(&line) {
                        Ok(Delivery::Queued) => {}
                        Ok(Delivery::Coalesced) => warn!("Busy, request for '{}' dropped", line.trim()),
                        Err(TriggerError::EmptyCity) => {}
                        Err(e @ TriggerError::WorkerGone) => return Err(e.into()),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down");
                    break;
                }
            }
        }

        drop(triggers);
        task.await.context("Weather worker task failed")?;
        Ok(())
    }
}
