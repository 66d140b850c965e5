//! Gallery server binary.
//!
//! Starts the axum web server and waits for Ctrl+C.

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use inkarta_lib::app::SharedState;
use inkarta_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Inkarta gallery server");

    let (db, config, dir) = inkarta_lib::init_foundation()?;
    tracing::info!(data_dir = %dir.display(), "Foundation ready");
    let state = SharedState::new(db, config);

    let shutdown = CancellationToken::new();
    let server_shutdown = shutdown.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(state, server_shutdown).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    shutdown.cancel();
    server_handle.await?;
    Ok(())
}
