use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};
use wifiloc::api::http::HttpServer;
use wifiloc::config::Config;
use wifiloc::resolver::{CoordinateResolver, SqliteResolver};
use wifiloc::storage::HistoryLog;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wifiloc=info".parse()?),
        )
        .json()
        .init();

    info!("Starting WifiLoc v{}", wifiloc::VERSION);

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    info!("Configuration loaded successfully");

    // Reference store: a missing file is tolerated, lookups then miss
    info!(
        "Using reference store {} (table {})",
        config.store.db_path.display(),
        config.store.table
    );
    let resolver: Arc<dyn CoordinateResolver> = Arc::new(SqliteResolver::new(&config.store)?);

    // Trip history lives for the process lifetime only
    let history = Arc::new(HistoryLog::new());

    info!("Initializing API server on {}", config.api.bind_addr);
    let http_server = HttpServer::new(resolver, history.clone(), config.api.clone());

    let server_handle = tokio::spawn(async move {
        if let Err(e) = http_server.serve().await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("WifiLoc started successfully");

    // Wait for shutdown signal (SIGTERM or SIGINT)
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("SIGINT received, shutting down gracefully...");
        }
        _ = async {
            #[cfg(unix)]
            {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        error!("Failed to register SIGTERM handler: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("SIGTERM received, shutting down gracefully...");
        }
    }

    server_handle.abort();

    info!(
        positions = history.len(),
        "WifiLoc shutdown complete, trip history discarded"
    );

    Ok(())
}
