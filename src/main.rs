//! task-prioritizer - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the task API.

use task_prioritizer::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_prioritizer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: store={} dir={} seed_on_startup={}",
        config.store_type.as_str(),
        config.store_dir.display(),
        config.seed_on_startup
    );

    api::serve(config).await?;

    Ok(())
}
