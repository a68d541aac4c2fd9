//! task-priority - HTTP Server Entry Point
//!
//! Starts the HTTP server that stores the task list and history documents.

use task_priority::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_priority=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: store={}, data_dir={}",
        config.store_type,
        config.data_dir.display()
    );

    // Start HTTP server
    info!("Starting server on {}", config.bind_addr());

    api::serve(config).await?;

    Ok(())
}
