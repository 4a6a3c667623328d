//! Inbound table reads and settings-blob access.

use rusqlite::OptionalExtension;

use super::Database;
use crate::error::MergeError;
use crate::models::InboundSummary;

/// Double-quote an identifier coming out of `pragma_table_info` so column
/// names never get spliced into SQL raw.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Database {
    /// All inbounds, ordered by port, for the console's port browser.
    pub fn list_inbounds(&self) -> Result<Vec<InboundSummary>, MergeError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, port, remark FROM inbounds ORDER BY port")?;
        let rows = stmt.query_map([], |row| {
            Ok(InboundSummary {
                id: row.get(0)?,
                port: row.get(1)?,
                remark: row.get(2)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Newest inbound listening on `port`, if any. Operators type ports, the
    /// merge runs on ids.
    pub fn inbound_id_by_port(&self, port: i64) -> Result<Option<i64>, MergeError> {
        let conn = self.conn();
        let id = conn
            .query_row(
                "SELECT id FROM inbounds WHERE port = ?1 ORDER BY id DESC LIMIT 1",
                [port],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn inbound_exists(&self, id: i64) -> Result<bool, MergeError> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM inbounds WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Which of `ids` have no inbound row. Order preserved, duplicates
    /// reported once.
    pub fn missing_inbounds(&self, ids: &[i64]) -> Result<Vec<i64>, MergeError> {
        let mut missing = Vec::new();
        for &id in ids {
            if !missing.contains(&id) && !self.inbound_exists(id)? {
                missing.push(id);
            }
        }
        Ok(missing)
    }

    /// Rows owned by an inbound in the `clients` table (TABLE mode only).
    pub fn client_count(&self, inbound_id: i64) -> Result<u64, MergeError> {
        let conn = self.conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM clients WHERE inbound_id = ?1",
            [inbound_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Raw settings blob text for one inbound, NULL and missing-row both
    /// collapse to None.
    pub(crate) fn settings_text(
        &self,
        settings_column: &str,
        inbound_id: i64,
    ) -> Result<Option<String>, MergeError> {
        let conn = self.conn();
        let sql = format!(
            "SELECT {} FROM inbounds WHERE id = ?1",
            quote_ident(settings_column)
        );
        let text: Option<Option<String>> = conn
            .query_row(&sql, [inbound_id], |row| row.get(0))
            .optional()?;
        Ok(text.flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::testutil::json_mode_db;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("settings"), "\"settings\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_inbound_id_by_port_picks_newest() {
        let (dir, path) = json_mode_db(&[(1, 443, "{}"), (2, 8443, "{}")]);
        let db = Database::open(&path).unwrap();
        {
            let conn = db.conn();
            conn.execute(
                "INSERT INTO inbounds (id, port, remark, settings) VALUES (9, 443, 'dup', '{}')",
                [],
            )
            .unwrap();
        }
        assert_eq!(db.inbound_id_by_port(443).unwrap(), Some(9));
        assert_eq!(db.inbound_id_by_port(8443).unwrap(), Some(2));
        assert_eq!(db.inbound_id_by_port(1234).unwrap(), None);
        drop(dir);
    }

    #[test]
    fn test_missing_inbounds_reports_once_in_order() {
        let (_dir, path) = json_mode_db(&[(1, 443, "{}")]);
        let db = Database::open(&path).unwrap();
        let missing = db.missing_inbounds(&[5, 1, 3, 5]).unwrap();
        assert_eq!(missing, vec![5, 3]);
    }

    #[test]
    fn test_list_inbounds_ordered_by_port() {
        let (_dir, path) = json_mode_db(&[(1, 8443, "{}"), (2, 443, "{}")]);
        let db = Database::open(&path).unwrap();
        let list = db.list_inbounds().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].port, 443);
        assert_eq!(list[1].id, 1);
    }
}
