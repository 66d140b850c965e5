use std::collections::HashMap;

use rusqlite::Connection;

use super::test_db;
use crate::schema::{self, column_exists};

#[test]
fn test_open_and_migrate() {
    let db = test_db();
    assert!(db.get_all_settings().unwrap().is_empty());
    assert_eq!(db.count_images().unwrap(), 0);
}

#[test]
fn test_settings_crud() {
    let db = test_db();
    db.set_setting("key1", "value1").unwrap();
    assert_eq!(db.get_setting("key1").unwrap(), Some("value1".into()));

    db.set_setting("key1", "value2").unwrap();
    assert_eq!(db.get_setting("key1").unwrap(), Some("value2".into()));
}

#[test]
fn test_settings_bulk_update() {
    let db = test_db();
    db.set_setting("SERVER_PORT", "5000").unwrap();

    let updates = HashMap::from([
        ("SERVER_PORT".to_string(), "8080".to_string()),
        ("TIMEZONE".to_string(), "Asia/Tokyo".to_string()),
    ]);
    db.update_settings_bulk(&updates).unwrap();

    let all = db.get_all_settings().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["SERVER_PORT"], "8080");
    assert_eq!(all["TIMEZONE"], "Asia/Tokyo");
}

#[test]
fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    schema::run_migrations(&conn).unwrap();
    schema::run_migrations(&conn).unwrap();
    assert!(column_exists(&conn, "images", "dark").unwrap());
}

#[test]
fn test_legacy_background_column_migrates_to_dark() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE images (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            artist TEXT NOT NULL,
            background INTEGER NOT NULL,
            data BLOB NOT NULL
         );
         INSERT INTO images (title, artist, background, data) VALUES ('Night', 'A', 0, x'00');
         INSERT INTO images (title, artist, background, data) VALUES ('Day', 'B', 255, x'00');",
    )
    .unwrap();

    schema::run_migrations(&conn).unwrap();

    assert!(!column_exists(&conn, "images", "background").unwrap());
    assert!(column_exists(&conn, "images", "created_at").unwrap());
    let dark: Vec<(String, bool)> = conn
        .prepare("SELECT title, dark FROM images ORDER BY id")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(dark, vec![("Night".into(), true), ("Day".into(), false)]);
}
