// HTTP server

mod config;
mod seed;

pub use config::*;
pub use seed::*;

use std::sync::Arc;

use tokio::{net::TcpListener, signal};

use crate::{
    api::{build_router, ApiContext},
    log::Logger,
    log_error, log_info,
    redis::{RedisConfiguration, RedisStore},
    store::{MemoryStore, Store},
};

/// Builds the store selected by the configuration
pub async fn build_store(
    logger: &Logger,
    config: &HttpServerConfiguration,
) -> Result<Arc<dyn Store>, ()> {
    match config.store_backend {
        StoreBackend::Memory => {
            log_info!(logger, "Using in-memory store. Data is lost on restart.");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let redis_config = RedisConfiguration::load_from_env(logger)?;
            let redis_logger = logger.make_child_logger("[REDIS] ");

            match RedisStore::connect(&redis_logger, &redis_config).await {
                Ok(s) => Ok(Arc::new(s)),
                Err(e) => {
                    log_error!(logger, format!("Could not connect to Redis: {}", e));
                    Err(())
                }
            }
        }
    }
}

async fn shutdown_signal(logger: Arc<Logger>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {
                log_info!(logger, "Received Ctrl+C, shutting down");
            }
            Err(e) => {
                log_error!(logger, format!("Could not install Ctrl+C handler: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
                log_info!(logger, "Received terminate signal, shutting down");
            }
            Err(e) => {
                log_error!(logger, format!("Could not install signal handler: {}", e));
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

/// Runs the HTTP server until a shutdown signal is received
pub async fn run_server(
    logger: Arc<Logger>,
    config: &HttpServerConfiguration,
    ctx: ApiContext,
) -> Result<(), std::io::Error> {
    if let Err(e) = tokio::fs::create_dir_all(&config.upload_dir).await {
        log_error!(
            logger,
            format!("Could not create upload directory {}: {}", config.upload_dir, e)
        );
        return Err(e);
    }

    let app = build_router(ctx);

    let listen_addr = config.get_listen_addr();

    let listener = match TcpListener::bind(&listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            log_error!(logger, format!("Could not bind to {}: {}", listen_addr, e));
            return Err(e);
        }
    };

    log_info!(logger, format!("Listening on {}", listen_addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(logger.clone()))
        .await?;

    log_info!(logger, "Server stopped");

    Ok(())
}
