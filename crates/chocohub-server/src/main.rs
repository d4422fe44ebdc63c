//! ChocoHub server - main entry point

use anyhow::Result;
use chocohub_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tracing::info;

use chocohub_server::{
    api,
    config::Config,
    db,
    features::FeatureState,
    storage::Storage,
};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::default()
        .with_file_prefix("chocohub-server")
        .with_filter_directives("chocohub_server=debug,tower_http=debug,sqlx=warn")
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting ChocoHub server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        working_dir = %config.storage.working_dir.display(),
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let state = FeatureState {
        db: pool,
        storage: Storage::new(config.storage.clone()),
        domain: config.server.domain.clone(),
    };

    let app = api::create_router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
