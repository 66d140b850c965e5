//! SettingsManager: DB-backed settings with defaults and env migration.

use std::collections::HashMap;

use gallery_db::Database;

use super::SettingInfo;
use super::defaults::{DEFAULT_SETTINGS, get_default, requires_restart};
use super::validation::validate_setting;

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(default) = get_default(key) {
            return Ok(default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Validate every entry first, then write them in a single transaction.
    pub fn update_settings(&self, settings: &HashMap<String, String>) -> Result<(), anyhow::Error> {
        for (key, value) in settings {
            check_known_and_valid(key, value)?;
        }
        self.db.update_settings_bulk(settings)?;
        Ok(())
    }

    /// Restore the given keys (or all known keys when empty) to their defaults.
    ///
    /// Every key is checked before anything is written.
    pub fn reset_settings(&self, keys: &[String]) -> Result<Vec<String>, anyhow::Error> {
        let targets: Vec<&str> = if keys.is_empty() {
            DEFAULT_SETTINGS.keys().copied().collect()
        } else {
            keys.iter().map(String::as_str).collect()
        };

        let defaults = targets
            .into_iter()
            .map(|key| {
                get_default(key)
                    .map(|default| (key.to_string(), default.to_string()))
                    .ok_or_else(|| anyhow::anyhow!("unknown setting key: {key}"))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        self.db.update_settings_bulk(&defaults)?;

        let mut reset: Vec<String> = defaults.into_keys().collect();
        reset.sort();
        Ok(reset)
    }

    /// Get all known settings, filling in defaults for missing keys.
    pub fn get_all_settings(&self) -> Result<HashMap<String, SettingInfo>, anyhow::Error> {
        let db_settings = self.db.get_all_settings()?;

        let result = DEFAULT_SETTINGS
            .iter()
            .map(|(key, def)| {
                let value = db_settings
                    .get(*key)
                    .cloned()
                    .unwrap_or_else(|| def.default.to_string());
                let info = SettingInfo {
                    key: key.to_string(),
                    has_value: !value.is_empty(),
                    value,
                    required: def.required,
                    description: def.description.to_string(),
                    restart_required: requires_restart(key),
                };
                (key.to_string(), info)
            })
            .collect();

        Ok(result)
    }

    /// Initialize default settings in DB (skip existing).
    pub fn initialize_defaults(&self) -> Result<(), anyhow::Error> {
        for (key, def) in DEFAULT_SETTINGS.iter() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            self.db.set_setting(key, def.default)?;
        }
        Ok(())
    }

    /// Copy environment variables for settings missing from the DB (one-time).
    pub fn migrate_from_env(&self) -> Result<u32, anyhow::Error> {
        let mut migrated = 0u32;
        for key in DEFAULT_SETTINGS.keys() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            if let Ok(env_val) = std::env::var(key) {
                if env_val.is_empty() {
                    continue;
                }
                if let Err(e) = validate_setting(key, &env_val) {
                    tracing::warn!("Ignoring invalid {key} from env: {e}");
                    continue;
                }
                self.db.set_setting(key, &env_val)?;
                tracing::info!("Migrated setting from env: {key}");
                migrated += 1;
            }
        }
        if migrated > 0 {
            tracing::info!("Migration completed: {migrated} settings migrated");
        }
        Ok(migrated)
    }
}

fn check_known_and_valid(key: &str, value: &str) -> Result<(), anyhow::Error> {
    if !DEFAULT_SETTINGS.contains_key(key) {
        anyhow::bail!("unknown setting key: {key}");
    }
    validate_setting(key, value).map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))
}
