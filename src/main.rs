// Main

mod api;
mod auth;
mod log;
mod models;
mod redis;
mod reports;
mod sequence;
mod server;
mod store;
mod utils;

use std::{path::PathBuf, sync::Arc};

use api::ApiContext;
use auth::AuthConfiguration;
use log::{LogConfig, Logger};
use server::{build_store, run_server, seed_admin, HttpServerConfiguration};

/// Main function
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load .env
    let _ = dotenvy::dotenv();

    // Initialize logger

    let logger = Arc::new(Logger::new(LogConfig::load_from_env()));

    // Print version

    const VERSION: &str = env!("CARGO_PKG_VERSION");

    log_info!(logger, format!("EKOS inspection server ({VERSION})"));

    // Load configuration

    let server_config = match HttpServerConfiguration::load_from_env(&logger) {
        Ok(c) => c,
        Err(_) => {
            std::process::exit(1);
        }
    };

    let auth_config = match AuthConfiguration::load_from_env(&logger) {
        Ok(c) => Arc::new(c),
        Err(_) => {
            std::process::exit(1);
        }
    };

    // Initialize store

    let store = match build_store(&logger, &server_config).await {
        Ok(s) => s,
        Err(_) => {
            std::process::exit(1);
        }
    };

    // Bootstrap admin

    if let Some(admin_config) = &server_config.admin {
        if let Err(e) = seed_admin(store.as_ref(), &logger, admin_config).await {
            log_error!(logger, format!("Could not create admin account: {}", e));
            std::process::exit(1);
        }
    }

    // Run server

    let ctx = ApiContext::new(
        Arc::new(logger.make_child_logger("[API] ")),
        store,
        auth_config,
        PathBuf::from(&server_config.upload_dir),
    );

    run_server(Arc::new(logger.make_child_logger("[SERVER] ")), &server_config, ctx).await?;

    // End of main

    Ok(())
}
