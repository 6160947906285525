//! Frequencia attendance desk
//!
//! Serves the desk page for one operator:
//! - Loads configuration and sets up logging
//! - Connects the attendance backend (REST or in-memory demo)
//! - Runs the page start-up sequence
//! - Serves the page until Ctrl+C or SIGTERM

use anyhow::Context;
use frequencia_common::{config::AppConfig, create_backend, metrics};
use frequencia_page::{
    create_router, host::spawn_pending_refresh, AppState, ControllerOptions, PageController,
};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    init_tracing(&config);

    info!(
        service = %config.observability.service_name,
        "Starting Frequencia desk v{}",
        frequencia_common::VERSION
    );

    // Initialize metrics
    metrics::register_metrics();

    let backend = create_backend(&config.backend)?;
    info!(backend = backend.name(), api = %config.api_base(), "Backend configured");

    let controller = PageController::new(backend, ControllerOptions::from_config(&config));
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    let state = AppState::new(config, controller);

    {
        let mut controller = state.controller.lock().await;
        // Start-up failures are shown as banners on the page
        let _ = controller.init().await;
        spawn_pending_refresh(&state, &mut controller);
    }

    let app = create_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.observability.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.observability.json_logging {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
