//! Device clock API:
//!   GET /device/rtc   – current Unix time for the panel's RTC
//!   GET /device/alarm – Unix time of the next local midnight

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::Value;

use crate::app::SharedState;
use crate::services::clock;

use super::err_json;

/// GET /device/rtc
pub async fn rtc() -> String {
    clock::now_timestamp().to_string()
}

/// GET /device/alarm
pub async fn alarm(State(state): State<SharedState>) -> Result<String, (StatusCode, Json<Value>)> {
    let tz = state.config().await.timezone;
    clock::next_alarm_timestamp(tz)
        .map(|ts| ts.to_string())
        .ok_or_else(|| {
            tracing::error!(%tz, "Could not compute next midnight");
            err_json(500, "Could not compute next midnight")
        })
}
