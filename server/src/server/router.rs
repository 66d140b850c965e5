use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

use super::api;
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState) -> Router {
    let upload_limit = state.max_upload_bytes();

    Router::new()
        // --- Core ---
        .route("/status", get(status_handler))
        // --- Gallery ---
        .route("/api/images", get(api::image::list_images))
        .route(
            "/image",
            post(api::image::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/image/next", get(api::image::next_image))
        .route("/image/next/{id}", put(api::image::set_next_image))
        .route("/image/{id}", get(api::image::get_image).delete(api::image::delete_image))
        .route("/api/rotation", get(api::image::rotation_status))
        // --- Device ---
        .route("/device/rtc", get(api::device::rtc))
        .route("/device/alarm", get(api::device::alarm))
        // --- Settings ---
        .route("/api/settings", get(api::settings::get_settings).put(api::settings::update_settings))
        .route("/api/settings/reset", post(api::settings::reset_settings))
        // --- Middleware ---
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn status_handler() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
