//! Gallery and rotation API.
//!
//! Bitmap endpoints answer with raw `image/bmp` bodies for the panel;
//! everything else is JSON.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use gallery_db::Database;
use image_pipeline::BITMAP_CONTENT_TYPE;
use serde_json::{Value, json};
use tokio::task::JoinError;

use crate::app::SharedState;
use crate::services::gallery::{GalleryError, GalleryService, ImageSize, NewImage};
use crate::services::rotation::RotationError;

use super::err_json;

type ApiError = (StatusCode, Json<Value>);

fn gallery_error(e: GalleryError) -> ApiError {
    let status = e.status();
    if status >= 500 {
        tracing::error!("Gallery request failed: {e}");
    }
    err_json(status, &e.to_string())
}

fn rotation_error(e: RotationError) -> ApiError {
    let status = e.status();
    if status >= 500 {
        tracing::error!("Rotation request failed: {e}");
    }
    err_json(status, &e.to_string())
}

fn join_error(e: JoinError) -> ApiError {
    tracing::error!("Blocking task failed: {e}");
    err_json(500, "Internal task failed")
}

fn bitmap_response(id: i64, data: Vec<u8>) -> Result<Response, ApiError> {
    Response::builder()
        .header(header::CONTENT_TYPE, BITMAP_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, data.len())
        .header("X-Image-Id", id)
        .body(Body::from(data))
        .map_err(|e| err_json(500, &e.to_string()))
}

fn image_label(db: &Database, id: Option<i64>) -> Result<Value, ApiError> {
    let Some(id) = id else {
        return Ok(Value::Null);
    };
    let image = db
        .get_image(id)
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(image.map_or(Value::Null, |image| json!({ "id": image.id, "title": image.title })))
}

/// GET /api/images
pub async fn list_images(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let images = state
        .db()
        .list_images()
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Json(json!({ "images": images, "count": images.len() })))
}

/// POST /image
pub async fn upload_image(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut title: Option<String> = None;
    let mut artist: Option<String> = None;
    let mut dark = false;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| err_json(400, &e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| err_json(400, &e.to_string()))?;
                data = Some(bytes.to_vec());
            }
            "title" | "artist" | "dark" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| err_json(400, &e.to_string()))?;
                match name.as_str() {
                    "title" => title = Some(text),
                    "artist" => artist = Some(text),
                    _ => dark = text == "on",
                }
            }
            _ => {}
        }
    }

    let meta = NewImage {
        title: title.ok_or_else(|| err_json(400, "Missing field: title"))?,
        artist: artist.ok_or_else(|| err_json(400, "Missing field: artist"))?,
        dark,
    };
    let data = data.ok_or_else(|| err_json(400, "Missing field: image"))?;

    let svc = GalleryService::new(state.db().clone(), state.config().await.dither_levels);
    let id = tokio::task::spawn_blocking(move || svc.upload(&meta, &data))
        .await
        .map_err(join_error)?
        .map_err(gallery_error)?;

    Ok(Json(json!({ "status": "ok", "id": id })))
}

/// GET /image/{id}
pub async fn get_image(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Query(size): Query<ImageSize>,
) -> Result<Response, ApiError> {
    let svc = GalleryService::new(state.db().clone(), state.config().await.dither_levels);
    let bitmap = tokio::task::spawn_blocking(move || {
        let image = svc.get(id)?;
        GalleryService::render(&image, size)
    })
    .await
    .map_err(join_error)?
    .map_err(gallery_error)?;

    bitmap_response(id, bitmap)
}

/// DELETE /image/{id}
pub async fn delete_image(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || state.rotation().delete_image(id))
        .await
        .map_err(join_error)?
        .map_err(rotation_error)?;

    Ok(Json(json!({ "status": "ok", "id": id })))
}

/// GET /image/next
pub async fn next_image(
    State(state): State<SharedState>,
    Query(size): Query<ImageSize>,
) -> Result<Response, ApiError> {
    let image = tokio::task::spawn_blocking(move || state.rotation().select_next())
        .await
        .map_err(join_error)?
        .map_err(rotation_error)?;

    let id = image.id;
    let bitmap = tokio::task::spawn_blocking(move || GalleryService::render(&image, size))
        .await
        .map_err(join_error)?
        .map_err(gallery_error)?;

    bitmap_response(id, bitmap)
}

/// PUT /image/next/{id}
pub async fn set_next_image(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || state.rotation().set_next(id))
        .await
        .map_err(join_error)?
        .map_err(rotation_error)?;

    Ok(Json(json!({ "status": "ok", "next": id })))
}

/// GET /api/rotation
pub async fn rotation_status(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    let selection = state.rotation().selection().map_err(rotation_error)?;
    Ok(Json(json!({
        "current": image_label(state.db(), selection.current)?,
        "next": image_label(state.db(), selection.next)?,
    })))
}
