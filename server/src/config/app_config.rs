//! Runtime application configuration loaded from DB + environment overrides.

use chrono_tz::Tz;
use image_pipeline::GrayLevels;

use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub dither_levels: GrayLevels,
    pub timezone: Tz,
    pub max_upload_mb: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 5000,
            dither_levels: GrayLevels::FULL,
            timezone: Tz::UTC,
            max_upload_mb: 20,
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };
        let defaults = Self::default();

        let mut server_host = g("SERVER_HOST");
        let mut server_port = parse_or(&g("SERVER_PORT"), defaults.server_port);

        // Environment variable overrides for deployment
        if let Ok(v) = std::env::var("SERVER_HOST") {
            if !v.is_empty() {
                server_host = v;
            }
        }
        if let Ok(v) = std::env::var("SERVER_PORT") {
            if let Ok(p) = v.parse::<u16>() {
                server_port = p;
            }
        }
        if server_host.is_empty() {
            server_host = defaults.server_host;
        }

        let dither_levels = GrayLevels::new(parse_or(&g("DITHER_LEVELS"), defaults.dither_levels.count()))
            .unwrap_or_else(|| {
                tracing::warn!("DITHER_LEVELS out of range, using full grayscale");
                defaults.dither_levels
            });

        let timezone = {
            let name = g("TIMEZONE");
            name.parse::<Tz>().unwrap_or_else(|_| {
                tracing::warn!("Unknown TIMEZONE '{name}', using UTC");
                Tz::UTC
            })
        };

        Ok(Self {
            server_host,
            server_port,
            dither_levels,
            timezone,
            max_upload_mb: parse_or(&g("MAX_UPLOAD_MB"), defaults.max_upload_mb),
        })
    }

    /// Reload config from the settings manager.
    pub fn reload(&mut self, sm: &SettingsManager) -> Result<(), anyhow::Error> {
        *self = Self::load(sm)?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}
