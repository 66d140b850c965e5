//! Upload ingestion and bitmap rendering for stored images.

use gallery_db::{Database, DbError, Image};
use image_pipeline::{GrayLevels, PipelineError};
use serde::{Deserialize, Deserializer};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    #[error("Image {0} not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl GalleryError {
    /// HTTP status code for this error.
    pub fn status(&self) -> u16 {
        match self {
            Self::Pipeline(PipelineError::Decode(_) | PipelineError::TargetTooLarge { .. }) => 400,
            Self::NotFound(_) => 404,
            Self::Pipeline(_) | Self::Db(_) => 500,
        }
    }
}

/// Requested output size; missing, empty or zero keeps the stored dimension.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ImageSize {
    #[serde(default, alias = "w", deserialize_with = "empty_as_none")]
    pub width: Option<u32>,
    #[serde(default, alias = "h", deserialize_with = "empty_as_none")]
    pub height: Option<u32>,
}

/// Query values arrive as strings; `?w=` means the same as leaving it out.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl ImageSize {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width.unwrap_or(0), self.height.unwrap_or(0))
    }
}

/// Metadata supplied with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImage {
    pub title: String,
    pub artist: String,
    pub dark: bool,
}

#[derive(Clone)]
pub struct GalleryService {
    db: Database,
    levels: GrayLevels,
}

impl GalleryService {
    pub fn new(db: Database, levels: GrayLevels) -> Self {
        Self { db, levels }
    }

    /// Dither an uploaded image and store it. Returns the new image id.
    pub fn upload(&self, meta: &NewImage, raw: &[u8]) -> Result<i64, GalleryError> {
        let bitmap = image_pipeline::ingest(raw, self.levels)?;
        let id = self
            .db
            .create_image(&meta.title, &meta.artist, meta.dark, &bitmap)?;
        info!(
            id,
            title = %meta.title,
            artist = %meta.artist,
            bytes = bitmap.len(),
            "Created new image"
        );
        Ok(id)
    }

    pub fn get(&self, id: i64) -> Result<Image, GalleryError> {
        self.db.get_image(id)?.ok_or(GalleryError::NotFound(id))
    }

    /// Produce the bitmap to serve for `image` at the requested size.
    pub fn render(image: &Image, size: ImageSize) -> Result<Vec<u8>, GalleryError> {
        let (width, height) = size.dimensions();
        let bitmap = image_pipeline::resize(&image.data, image.dark, width, height)?;
        info!(
            id = image.id,
            title = %image.title,
            width,
            height,
            "Rendering image"
        );
        Ok(bitmap)
    }
}
