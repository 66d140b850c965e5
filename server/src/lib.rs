pub mod app;
pub mod config;
pub mod server;
pub mod services;

use std::path::PathBuf;

use gallery_db::Database;

use config::{AppConfig, SettingsManager};

/// Determine the data directory for the application.
/// Priority: INKARTA_DATA_DIR env var > ~/.inkarta
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("INKARTA_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".inkarta")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Open the database, migrate settings and load the runtime config.
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = dir.join("inkarta.db");

    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());

    // Copy environment values for unset keys (one-time)
    if let Err(e) = sm.migrate_from_env() {
        tracing::error!("Failed to migrate from env: {e}");
    }
    sm.initialize_defaults()?;

    let config = AppConfig::load(&sm)?;
    let images = db.count_images()?;

    tracing::info!(
        addr = %config.bind_addr(),
        levels = config.dither_levels.count(),
        timezone = %config.timezone,
        images,
        "Settings loaded"
    );
    Ok((db, config, dir))
}
