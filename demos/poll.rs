//! Polls the local host every ten seconds and prints each record as a JSON line.
//!
//! Usage: `cargo run --example poll -- [config.json]`

use std::sync::Arc;
use std::time::Duration;

use smnet::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smnet=info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SmNetConfig::from_json_file(path)?,
        None => SmNetConfig::default(),
    };
    info!(?config, "{}", DESCRIPTION);

    let smnet = Arc::new(SmNet::new(config)?);
    let mut interval = tokio::time::interval(Duration::from_secs(10));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match Arc::clone(&smnet).gather_async().await {
                    Ok(metrics) => {
                        for metric in metrics {
                            match serde_json::to_string(&metric) {
                                Ok(line) => println!("{line}"),
                                Err(e) => error!("failed to encode record: {}", e),
                            }
                        }
                    }
                    Err(e) => error!("poll failed: {}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}
