use std::sync::Arc;

use anyhow::{Context, Result};
use pd_core::{user_data_logger, StreamSink};
use pd_db::DbConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Use RUST_LOG env var to control log levels, defaulting to info.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!("personal-data exited with error: {:#}", e);
        std::process::exit(1);
    }
}

/// Log every row of the `users` table through the redacting `user_data` logger.
async fn run() -> Result<()> {
    let config = DbConfig::from_env().context("Failed to load database configuration")?;
    let logger = user_data_logger(Arc::new(StreamSink::stderr()));
    let separator = logger.formatter().spec().separator();

    let count = pd_db::stream_users(&config, |record| {
        logger.info(record.to_log_line(separator));
    })
    .await
    .context("Failed to stream users")?;

    info!(rows = count, "Logged user records");
    Ok(())
}
