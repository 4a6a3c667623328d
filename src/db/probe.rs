//! Storage-mode classification for a panel database.
//!
//! Panels store client records one of two ways: older builds keep a dedicated
//! `clients` table, newer ones embed a `clients` array in each inbound's JSON
//! settings blob. The probe is read-only and decides which strategy runs.

use super::Database;
use crate::config;
use crate::error::{MergeError, SchemaError};
use crate::models::StorageMode;

impl Database {
    /// Classify the database. Checks, in order: the `inbounds` table exists,
    /// a `clients` table exists (TABLE mode), otherwise the first configured
    /// candidate column present on `inbounds` wins (JSON mode).
    pub fn storage_mode(&self) -> Result<StorageMode, MergeError> {
        if !self.table_exists("inbounds")? {
            return Err(SchemaError::NotAnInboundsDatabase.into());
        }
        if self.table_exists("clients")? {
            return Ok(StorageMode::Table);
        }
        let columns = self.table_columns("inbounds")?;
        for candidate in config::settings_columns() {
            if columns.iter().any(|c| c == &candidate) {
                return Ok(StorageMode::Json {
                    settings_column: candidate,
                });
            }
        }
        Err(SchemaError::NoSettingsColumn.into())
    }

    pub(crate) fn table_exists(&self, name: &str) -> Result<bool, MergeError> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [name],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Column names of `table`, in schema order.
    pub(crate) fn table_columns(&self, table: &str) -> Result<Vec<String>, MergeError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
        let rows = stmt.query_map([table], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::testutil::{json_mode_db, table_mode_db};
    use rusqlite::Connection;

    #[test]
    fn test_probe_prefers_clients_table() {
        let (_dir, path) = table_mode_db(&[(1, 443)], &[]);
        let db = Database::open(&path).unwrap();
        assert_eq!(db.storage_mode().unwrap(), StorageMode::Table);
    }

    #[test]
    fn test_probe_finds_settings_column() {
        let (_dir, path) = json_mode_db(&[(1, 443, "{}")]);
        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.storage_mode().unwrap(),
            StorageMode::Json {
                settings_column: "settings".to_string()
            }
        );
    }

    #[test]
    fn test_probe_honors_candidate_priority() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE inbounds (id INTEGER PRIMARY KEY, port INTEGER, settingsJson TEXT);",
        )
        .unwrap();
        drop(conn);
        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.storage_mode().unwrap(),
            StorageMode::Json {
                settings_column: "settingsJson".to_string()
            }
        );
    }

    #[test]
    fn test_probe_rejects_foreign_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY);")
            .unwrap();
        drop(conn);
        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.storage_mode(),
            Err(MergeError::Schema(SchemaError::NotAnInboundsDatabase))
        );
    }

    #[test]
    fn test_probe_reports_missing_settings_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE inbounds (id INTEGER PRIMARY KEY, port INTEGER);")
            .unwrap();
        drop(conn);
        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.storage_mode(),
            Err(MergeError::Schema(SchemaError::NoSettingsColumn))
        );
    }
}
