//! cardscan-server - REST API server binary.

use std::net::SocketAddr;

use cardscan_core::CardScanConfig;
use cardscan_server::{create_server, create_server_with_static, AppState};
use tokio::signal;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("cardscan_server=debug".parse()?),
        )
        .init();

    // File named by CARDSCAN_CONFIG, then CARDSCAN_* overrides
    let config = CardScanConfig::load()?;

    let state = AppState::from_config(&config.storage)?;

    let app = match &config.server.static_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Serving static files");
            create_server_with_static(state.clone(), dir)
        }
        None => create_server(state.clone()),
    };

    // Start server
    let addr: SocketAddr = config.server.bind_address().parse()?;
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            error!("Port {} is already in use", addr.port());
            info!(
                "Stop the process holding port {} or set CARDSCAN_PORT to another port",
                addr.port()
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    info!("Starting cardscan-server on http://{}", addr);

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, closing card store...");
        })
        .await?;

    state.shutdown().await?;

    info!("Server stopped cleanly");
    Ok(())
}
