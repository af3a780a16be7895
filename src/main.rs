mod api;
mod config;
mod server;
mod store;

use clap::Parser;
use config::{Args, Config};
use server::Server;
use std::sync::Arc;
use store::MemoryStore;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting memkv - volatile key-value store over HTTP");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(MemoryStore::new());
    let app = api::router(store, config.max_body_bytes);

    let server = Server::bind(&config.server_addr, app).await?;
    info!("Server listening on: {}", server.local_addr());

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl-C, shutting down");
        })
        .await?;

    Ok(())
}
