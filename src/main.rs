#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use site_budget::{
    api::{self, AppState},
    config::{self, server::ServerConfig},
    core::catalog,
    errors::{Error, Result},
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Listener settings
    let server_config = ServerConfig::from_env()
        .inspect_err(|e| error!("Invalid server configuration: {}", e))?;

    // 4. Connect and make sure every table exists
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the material and supplier catalog (optional)
    match config::catalog::load_default_config() {
        Ok(catalog_config) => {
            catalog::seed_catalog(&db, &catalog_config)
                .await
                .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
        }
        Err(e) => warn!("Catalog not loaded, starting with the existing catalog: {}", e),
    }

    // 6. Serve until ctrl-c
    let app = api::router(AppState { db });
    let listener = tokio::net::TcpListener::bind(server_config.bind_address).await?;
    info!("Listening on {}", server_config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
