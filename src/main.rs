//! mopidy-http server entry point.
//!
//! Starts the HTTP frontend, runs until Ctrl-C, then stops it.

use tracing_subscriber::EnvFilter;

use mopidy_http::config::FrontendConfig;
use mopidy_http::domain::EventBus;
use mopidy_http::frontend::Frontend;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = FrontendConfig::from_env()?;
    tracing::info!(addr = %config.bind_addr(), "starting mopidy-http");

    // Backend events are published here by the player core
    let event_bus = EventBus::new(config.event_bus_capacity);

    let frontend = Frontend::builder(config).event_bus(event_bus).spawn();
    frontend.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");

    if let Err(err) = frontend.stop().await {
        tracing::warn!(error = %err, "HTTP frontend did not stop cleanly");
    }

    Ok(())
}
