//! Settings management API:
//!   GET  /api/settings       – get all settings
//!   PUT  /api/settings       – update settings
//!   POST /api/settings/reset – reset settings to defaults

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::app::SharedState;
use crate::config::SettingsManager;
use crate::config::defaults::requires_restart;

use super::err_json;

/// GET /api/settings
pub async fn get_settings(State(state): State<SharedState>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let sm = SettingsManager::new(state.db().clone());
    let all = sm
        .get_all_settings()
        .map_err(|e| err_json(500, &format!("Failed to get settings: {e}")))?;

    Ok(Json(json!({ "settings": all })))
}

/// PUT /api/settings
pub async fn update_settings(
    State(state): State<SharedState>,
    Json(body): Json<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let sm = SettingsManager::new(state.db().clone());
    sm.update_settings(&body).map_err(|e| err_json(400, &e.to_string()))?;

    state
        .reload_config()
        .await
        .map_err(|e| err_json(500, &format!("Failed to reload config: {e}")))?;

    let mut updated: Vec<&String> = body.keys().collect();
    updated.sort();
    // Bind address and body limit are read once at startup
    let restart_required: Vec<&String> = updated.iter().copied().filter(|k| requires_restart(k)).collect();
    tracing::info!(?updated, ?restart_required, "Settings updated");

    Ok(Json(json!({
        "status": "ok",
        "updated": updated,
        "restart_required": restart_required,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub keys: Vec<String>,
}

/// POST /api/settings/reset
pub async fn reset_settings(
    State(state): State<SharedState>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let sm = SettingsManager::new(state.db().clone());
    let reset = sm
        .reset_settings(&body.keys)
        .map_err(|e| err_json(400, &e.to_string()))?;

    state
        .reload_config()
        .await
        .map_err(|e| err_json(500, &format!("Failed to reload config: {e}")))?;

    let restart_required: Vec<&String> = reset.iter().filter(|k| requires_restart(k)).collect();
    tracing::info!(?reset, ?restart_required, "Settings reset to defaults");
    Ok(Json(json!({
        "status": "ok",
        "reset": reset,
        "restart_required": restart_required,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use gallery_db::Database;

    fn state() -> SharedState {
        let db = Database::open_in_memory().unwrap();
        SettingsManager::new(db.clone()).initialize_defaults().unwrap();
        SharedState::new(db, AppConfig::default())
    }

    fn body(pairs: &[(&str, &str)]) -> Json<HashMap<String, String>> {
        Json(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[tokio::test]
    async fn test_update_reloads_runtime_config() {
        let state = state();
        let Json(resp) = update_settings(
            State(state.clone()),
            body(&[("DITHER_LEVELS", "4"), ("TIMEZONE", "Europe/Paris")]),
        )
        .await
        .unwrap();
        assert_eq!(resp["restart_required"], json!([]));

        let config = state.config().await;
        assert_eq!(config.dither_levels.count(), 4);
        assert_eq!(config.timezone, chrono_tz::Tz::Europe__Paris);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_values_atomically() {
        let state = state();
        let (status, _) = update_settings(State(state.clone()), body(&[("DITHER_LEVELS", "4"), ("SERVER_PORT", "0")]))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let Json(all) = get_settings(State(state)).await.unwrap();
        assert_eq!(all["settings"]["DITHER_LEVELS"]["value"], "256");
    }

    #[tokio::test]
    async fn test_update_reports_settings_applied_on_restart() {
        let state = state();
        let Json(resp) = update_settings(
            State(state.clone()),
            body(&[("SERVER_PORT", "6001"), ("MAX_UPLOAD_MB", "50"), ("TIMEZONE", "UTC")]),
        )
        .await
        .unwrap();
        assert_eq!(resp["restart_required"], json!(["MAX_UPLOAD_MB", "SERVER_PORT"]));

        let Json(all) = get_settings(State(state)).await.unwrap();
        assert_eq!(all["settings"]["SERVER_PORT"]["restart_required"], true);
        assert_eq!(all["settings"]["TIMEZONE"]["restart_required"], false);
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let state = state();
        update_settings(State(state.clone()), body(&[("MAX_UPLOAD_MB", "50")]))
            .await
            .unwrap();

        let Json(resp) = reset_settings(
            State(state.clone()),
            Json(ResetRequest {
                keys: vec!["MAX_UPLOAD_MB".into()],
            }),
        )
        .await
        .unwrap();
        assert_eq!(resp["reset"], json!(["MAX_UPLOAD_MB"]));
        assert_eq!(resp["restart_required"], json!(["MAX_UPLOAD_MB"]));
        assert_eq!(state.config().await.max_upload_mb, 20);
    }
}
