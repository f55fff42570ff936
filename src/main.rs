//! Startup wiring: configuration, logging, state construction, serve.

use tokio::net::TcpListener;

use kanban_api::config::AppConfig;
use kanban_api::http::{AppState, HttpServer};
use kanban_api::lifecycle::Shutdown;
use kanban_api::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Fail fast on missing or invalid configuration, before anything binds.
    let config = AppConfig::from_env()?;

    logging::init(&config.observability.log_filter);

    tracing::info!(
        bind_address = %config.server.bind_address,
        upstream = %config.upstream.base_url,
        upstream_retries = config.upstream.retries,
        upstream_max_in_flight = config.upstream.max_in_flight,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_exporter(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.server.bind_address.clone();
    let state = AppState::new(config)?;
    let listener = TcpListener::bind(&bind_address).await?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    HttpServer::new(state).run(listener, receiver).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
