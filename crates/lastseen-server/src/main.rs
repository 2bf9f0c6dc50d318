mod config;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use lastseen_core::dispatcher::Dispatcher;
use lastseen_core::error::SeenError;
use lastseen_db::Database;
use lastseen_types::events::ChatEvent;

use crate::config::Config;

/// Reads one JSON `ChatEvent` per line on stdin and writes one JSON
/// `OutboundMessage` per line on stdout for every reply.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr, stdout carries replies
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lastseen=debug,lastseen_core=debug,lastseen_db=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let db = match Database::open(&config.db_path) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            // Keep consuming the feed so the host is never blocked on us
            error!("{}; seen tracking disabled", SeenError::StorageUnavailable(e));
            while lines.next_line().await?.is_some() {}
            return Ok(());
        }
    };

    let dispatcher = Dispatcher::new(db, config.seen);
    let mut stdout = tokio::io::stdout();

    info!("lastseen ready, reading events from stdin");

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let event: ChatEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring malformed event: {}", e);
                continue;
            }
        };

        // Run blocking DB work off the async runtime, one event at a time
        let server = event.server().to_string();
        let d = dispatcher.clone();
        let reply = match tokio::task::spawn_blocking(move || d.handle(event)).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(server = %server, "Event handler panicked: {}", e);
                continue;
            }
        };

        if let Some(message) = reply {
            let mut out = serde_json::to_string(&message)?;
            out.push('\n');
            stdout.write_all(out.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    info!("Event stream closed, shutting down");
    Ok(())
}
