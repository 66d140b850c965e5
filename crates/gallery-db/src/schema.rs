//! Database schema definitions and migrations.

use rusqlite::Connection;

use crate::DbError;

pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;
    migrate_legacy_tables(conn)?;
    Ok(())
}

/// Bring tables created by older server versions up to the current schema.
fn migrate_legacy_tables(conn: &Connection) -> Result<(), DbError> {
    migrate_images_background(conn)?;
    if !column_exists(conn, "images", "created_at")? {
        // ADD COLUMN only accepts constant defaults; old rows keep NULL
        conn.execute_batch("ALTER TABLE images ADD COLUMN created_at TIMESTAMP;")?;
    }
    Ok(())
}

/// images: background INTEGER (0 = black, 255 = white) -> dark BOOLEAN
fn migrate_images_background(conn: &Connection) -> Result<(), DbError> {
    if !column_exists(conn, "images", "background")? {
        return Ok(());
    }
    tracing::info!("Migrating images table from legacy background column");
    if !column_exists(conn, "images", "dark")? {
        conn.execute_batch("ALTER TABLE images ADD COLUMN dark BOOLEAN NOT NULL DEFAULT false;")?;
    }
    conn.execute_batch(
        "UPDATE images SET dark = (background = 0);
         ALTER TABLE images DROP COLUMN background;",
    )?;
    Ok(())
}

pub(crate) fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|name| name.as_deref() == Ok(column));
    Ok(exists)
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    artist TEXT NOT NULL,
    dark BOOLEAN NOT NULL DEFAULT false,
    data BLOB NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;
