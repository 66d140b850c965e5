//! Stored gallery images.

use rusqlite::{OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{Database, DbError};

/// A stored image. `data` holds the dithered bitmap at its native resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub dark: bool,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub created_at: Option<String>,
}

/// Image metadata without the bitmap payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub dark: bool,
    pub created_at: Option<String>,
}

const IMAGE_COLUMNS: &str = "id, title, artist, dark, data, created_at";

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<Image> {
    Ok(Image {
        id: row.get(0)?,
        title: row.get(1)?,
        artist: row.get(2)?,
        dark: row.get(3)?,
        data: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    pub fn create_image(
        &self,
        title: &str,
        artist: &str,
        dark: bool,
        data: &[u8],
    ) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO images (title, artist, dark, data) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![title, artist, dark, data],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_image(&self, id: i64) -> Result<Option<Image>, DbError> {
        self.with_conn(|conn| {
            let image = conn
                .query_row(
                    &format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = ?1"),
                    [id],
                    image_from_row,
                )
                .optional()?;
            Ok(image)
        })
    }

    /// Pick a uniformly random image, or `None` when the gallery is empty.
    pub fn get_random_image(&self) -> Result<Option<Image>, DbError> {
        self.with_conn(|conn| {
            let image = conn
                .query_row(
                    &format!(
                        "SELECT {IMAGE_COLUMNS} FROM images
                         WHERE id = (SELECT id FROM images ORDER BY RANDOM() LIMIT 1)"
                    ),
                    [],
                    image_from_row,
                )
                .optional()?;
            Ok(image)
        })
    }

    /// Like [`Database::get_random_image`] but without loading the bitmap.
    pub fn get_random_image_id(&self) -> Result<Option<i64>, DbError> {
        self.with_conn(|conn| {
            let id = conn
                .query_row("SELECT id FROM images ORDER BY RANDOM() LIMIT 1", [], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(id)
        })
    }

    pub fn list_images(&self) -> Result<Vec<ImageSummary>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, artist, dark, created_at FROM images ORDER BY id DESC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(ImageSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist: row.get(2)?,
                    dark: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
        })
    }

    pub fn image_exists(&self, id: i64) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM images WHERE id = ?1)",
                [id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    pub fn count_images(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    /// Delete an image. Returns `false` when no row matched.
    pub fn delete_image(&self, id: i64) -> Result<bool, DbError> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM images WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}
