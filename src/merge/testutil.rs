//! Fixture builders shared by the engine's test modules.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;

/// Panel database in TABLE mode: `inbounds` plus a `clients` table.
/// `inbounds` entries are `(id, port)`; `clients` are `(inbound_id, uuid, email)`.
pub(crate) fn table_mode_db(
    inbounds: &[(i64, i64)],
    clients: &[(i64, &str, &str)],
) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE inbounds (
             id INTEGER PRIMARY KEY,
             port INTEGER NOT NULL,
             remark TEXT NOT NULL DEFAULT ''
         );
         CREATE TABLE clients (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             inbound_id INTEGER NOT NULL,
             uuid TEXT NOT NULL,
             email TEXT NOT NULL,
             enable INTEGER NOT NULL DEFAULT 1
         );",
    )
    .unwrap();
    for (id, port) in inbounds {
        conn.execute(
            "INSERT INTO inbounds (id, port, remark) VALUES (?1, ?2, ?3)",
            rusqlite::params![id, port, format!("inbound-{}", id)],
        )
        .unwrap();
    }
    for (inbound_id, uuid, email) in clients {
        conn.execute(
            "INSERT INTO clients (inbound_id, uuid, email) VALUES (?1, ?2, ?3)",
            rusqlite::params![inbound_id, uuid, email],
        )
        .unwrap();
    }
    (dir, path)
}

/// Panel database in JSON mode: `inbounds` with a `settings` text column.
/// Entries are `(id, port, settings_json)`.
pub(crate) fn json_mode_db(inbounds: &[(i64, i64, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("panel.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE inbounds (
             id INTEGER PRIMARY KEY,
             port INTEGER NOT NULL,
             remark TEXT NOT NULL DEFAULT '',
             settings TEXT
         );",
    )
    .unwrap();
    for (id, port, settings) in inbounds {
        conn.execute(
            "INSERT INTO inbounds (id, port, remark, settings) VALUES (?1, ?2, '', ?3)",
            rusqlite::params![id, port, settings],
        )
        .unwrap();
    }
    (dir, path)
}

/// Parsed settings blob of one inbound, straight from disk.
pub(crate) fn settings_of(path: &Path, settings_column: &str, inbound_id: i64) -> Value {
    let conn = Connection::open(path).unwrap();
    let sql = format!(
        "SELECT \"{}\" FROM inbounds WHERE id = ?1",
        settings_column.replace('"', "\"\"")
    );
    let text: String = conn.query_row(&sql, [inbound_id], |row| row.get(0)).unwrap();
    serde_json::from_str(&text).unwrap()
}

pub(crate) fn new_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}
