//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, bool, &'static str);

const DEFS: &[DefTuple] = &[
    ("SERVER_HOST", "0.0.0.0", true, "Address the HTTP server binds to (applied on restart)"),
    ("SERVER_PORT", "5000", true, "Port the HTTP server listens on (applied on restart)"),
    (
        "DITHER_LEVELS",
        "256",
        true,
        "Gray levels produced when dithering uploads (256 = full grayscale, 2 = black and white)",
    ),
    ("TIMEZONE", "UTC", true, "Timezone used for the device midnight alarm"),
    ("MAX_UPLOAD_MB", "20", false, "Maximum upload size in megabytes (applied on restart)"),
];

/// Settings read once when the server starts.
const RESTART_REQUIRED: &[&str] = &["SERVER_HOST", "SERVER_PORT", "MAX_UPLOAD_MB"];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub required: bool,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, required, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    required,
                    description,
                },
            )
        })
        .collect()
});

/// Whether a new value for `key` only takes effect after a restart.
pub fn requires_restart(key: &str) -> bool {
    RESTART_REQUIRED.contains(&key)
}

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
