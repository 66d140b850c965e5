use std::sync::Arc;

use gallery_db::Database;
use tokio::sync::RwLock;

use crate::config::{AppConfig, SettingsManager};
use crate::services::rotation::Rotation;

/// Application shared state accessible from axum handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration (reloadable)
    config: RwLock<AppConfig>,
    /// Database handle
    db: Database,
    /// Current/next image pointers
    rotation: Rotation,
}

impl SharedState {
    /// Create shared state from an already-opened database and loaded config.
    pub fn new(db: Database, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(SharedStateInner {
                config: RwLock::new(config),
                rotation: Rotation::new(db.clone()),
                db,
            }),
        }
    }

    /// Address to bind the HTTP server to.
    pub fn bind_addr(&self) -> String {
        self.inner
            .config
            .try_read()
            .map(|c| c.bind_addr())
            .unwrap_or_else(|_| AppConfig::default().bind_addr())
    }

    /// Request body limit for uploads.
    pub fn max_upload_bytes(&self) -> usize {
        self.inner
            .config
            .try_read()
            .map(|c| c.max_upload_bytes())
            .unwrap_or_else(|_| AppConfig::default().max_upload_bytes())
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn rotation(&self) -> &Rotation {
        &self.inner.rotation
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    /// Reload config from the database.
    pub async fn reload_config(&self) -> Result<(), anyhow::Error> {
        let sm = SettingsManager::new(self.inner.db.clone());
        let mut config = self.inner.config.write().await;
        config.reload(&sm)?;
        Ok(())
    }
}
