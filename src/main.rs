mod auth;
mod config;
mod engine;
mod error;
mod models;
mod query;
mod router;
mod routes;
mod store;

use std::sync::Arc;

use config::Config;
use router::{create_router, shutdown_signal};
use store::Store;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.rust_log.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = match &config.snapshot_path {
        Some(path) if path.exists() => {
            tracing::info!(path = %path.display(), "restoring state from snapshot");
            Store::load_snapshot(path)?
        }
        _ => Store::seed()?,
    };
    let store = Arc::new(RwLock::new(store));

    let app = create_router(store.clone());
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Mirror of the original front end's local-storage writes: best-effort
    // state snapshot on clean shutdown, no durability guarantee.
    if let Some(path) = &config.snapshot_path {
        store.read().await.save_snapshot(path)?;
        tracing::info!(path = %path.display(), "state snapshot written");
    }

    Ok(())
}
