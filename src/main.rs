//! folio - headless driver for the portfolio site's client behavior
//!
//! Reads newline-delimited JSON UI events from stdin, replays them against the
//! portfolio layout held in memory and prints the final document state as
//! JSON on stdout. Logs go to stderr.

use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use folio::dom::MemoryDom;
use folio::{App, Config, Error, Result, UiEvent};

const INBOX_CAPACITY: usize = 64;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Arc::new(Config::from_env()?);

    // Validate configuration
    config.validate()?;

    // Initialize logging/tracing
    folio::logging::init_tracing(&config.app.log_level, &config.app.environment)?;

    config.log_config();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting folio");

    let (tx, rx) = mpsc::channel(INBOX_CAPACITY);
    let reader = tokio::spawn(read_events(tx));

    let app = App::new(config, MemoryDom::portfolio());
    let dom = app.run(rx).await?;

    match reader.await {
        Ok(result) => result?,
        Err(e) => return Err(Error::internal(format!("Event reader panicked: {}", e))),
    }

    let snapshot = serde_json::to_string_pretty(&dom.snapshot())?;
    println!("{}", snapshot);

    tracing::info!("folio shutdown complete");
    Ok(())
}

/// Forward parsed stdin lines to the event loop until EOF
async fn read_events(tx: mpsc::Sender<UiEvent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<UiEvent>(&line) {
            Ok(event) => {
                if tx.send(event).await.is_err() {
                    return Err(Error::ShuttingDown);
                }
            },
            Err(e) => {
                let error = Error::from(e);
                folio::log_error!(error, "Skipping malformed event", line = line_no);
            },
        }
    }

    tracing::debug!(lines = line_no, "Reached end of input");
    Ok(())
}
