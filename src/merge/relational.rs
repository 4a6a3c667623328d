//! TABLE-mode merge: clients live as rows of a dedicated `clients` table.

use rusqlite::params_from_iter;

use crate::db::inbounds::quote_ident;
use crate::db::Database;
use crate::error::{MergeError, SchemaError};
use crate::models::{MergeMode, MergeResult};

impl Database {
    /// Copy every source-owned client row whose `uuid` the target does not
    /// already have. One INSERT..SELECT in one transaction: all qualifying
    /// rows land or none do.
    pub(crate) fn merge_relational(
        &self,
        target_id: i64,
        source_ids: &[i64],
    ) -> Result<MergeResult, MergeError> {
        let columns = self.table_columns("clients")?;
        let copyable: Vec<String> = columns
            .into_iter()
            .filter(|c| c != "id" && c != "inbound_id")
            .collect();
        if copyable.is_empty() {
            return Err(SchemaError::NoClientsTable.into());
        }
        if !copyable.iter().any(|c| c == "uuid") {
            return Err(SchemaError::NoUuidColumn.into());
        }

        let before = self.client_count(target_id)?;

        let col_list = copyable
            .iter()
            .map(|c| quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let select_list = copyable
            .iter()
            .map(|c| format!("c.{}", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        // ?1 is the target; sources bind after it
        let placeholders = (0..source_ids.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO clients (inbound_id, {col_list}) \
             SELECT ?1, {select_list} FROM clients c \
             WHERE c.inbound_id IN ({placeholders}) \
               AND c.uuid NOT IN (SELECT uuid FROM clients WHERE inbound_id = ?1)"
        );

        {
            let mut conn = self.conn();
            let tx = conn.transaction()?;
            tx.execute(
                &sql,
                params_from_iter(std::iter::once(target_id).chain(source_ids.iter().copied())),
            )?;
            tx.commit()?;
        }

        let after = self.client_count(target_id)?;
        Ok(MergeResult {
            mode: MergeMode::Table,
            added: after.saturating_sub(before),
            before,
            after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::testutil::table_mode_db;
    use rusqlite::Connection;

    #[test]
    fn test_merge_skips_duplicate_uuid() {
        let (_dir, path) = table_mode_db(
            &[(1, 443), (2, 8443)],
            &[(1, "A", "a@x.com"), (2, "A", "a@x.com"), (2, "B", "b@x.com")],
        );
        let db = Database::open(&path).unwrap();
        let result = db.merge_relational(1, &[2]).unwrap();
        assert_eq!(result.mode, MergeMode::Table);
        assert_eq!(result.before, 1);
        assert_eq!(result.added, 1);
        assert_eq!(result.after, 2);

        let conn = Connection::open(&path).unwrap();
        let dup: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM clients WHERE inbound_id = 1 AND uuid = 'A'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(dup, 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let (_dir, path) = table_mode_db(
            &[(1, 443), (2, 8443)],
            &[(2, "A", "a@x.com"), (2, "B", "b@x.com")],
        );
        let db = Database::open(&path).unwrap();
        let first = db.merge_relational(1, &[2]).unwrap();
        assert_eq!(first.added, 2);
        let second = db.merge_relational(1, &[2]).unwrap();
        assert_eq!(second.added, 0);
        assert_eq!(second.after, first.after);
    }

    #[test]
    fn test_union_of_multiple_sources() {
        let (_dir, path) = table_mode_db(
            &[(1, 443), (2, 8443), (3, 9443)],
            &[(2, "A", "a@x.com"), (3, "A", "a2@x.com"), (3, "B", "b@x.com")],
        );
        let db = Database::open(&path).unwrap();
        let result = db.merge_relational(1, &[2, 3]).unwrap();
        // uuid A exists twice across sources; only one copy can land
        assert_eq!(result.added, 2);
    }

    #[test]
    fn test_failed_insert_leaves_counts_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE inbounds (id INTEGER PRIMARY KEY, port INTEGER, remark TEXT);
             CREATE TABLE clients (
                 id INTEGER PRIMARY KEY AUTOINCREMENT,
                 inbound_id INTEGER NOT NULL,
                 uuid TEXT NOT NULL,
                 email TEXT NOT NULL UNIQUE
             );
             INSERT INTO inbounds (id, port) VALUES (1, 443), (2, 8443);
             INSERT INTO clients (inbound_id, uuid, email) VALUES (2, 'A', 'a@x.com');",
        )
        .unwrap();
        drop(conn);

        let db = Database::open(&path).unwrap();
        // Copying A to inbound 1 would duplicate the globally-unique email
        let err = db.merge_relational(1, &[2]).unwrap_err();
        assert!(matches!(err, MergeError::Execution(_)));
        assert_eq!(db.client_count(1).unwrap(), 0);
        assert_eq!(db.client_count(2).unwrap(), 1);
    }

    #[test]
    fn test_missing_uuid_column_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE inbounds (id INTEGER PRIMARY KEY, port INTEGER, remark TEXT);
             CREATE TABLE clients (id INTEGER PRIMARY KEY, inbound_id INTEGER, email TEXT);
             INSERT INTO inbounds (id, port) VALUES (1, 443), (2, 8443);",
        )
        .unwrap();
        drop(conn);

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.merge_relational(1, &[2]),
            Err(MergeError::Schema(SchemaError::NoUuidColumn))
        );
    }

    #[test]
    fn test_extra_columns_are_copied() {
        let (_dir, path) = table_mode_db(&[(1, 443), (2, 8443)], &[(2, "A", "a@x.com")]);
        let db = Database::open(&path).unwrap();
        db.merge_relational(1, &[2]).unwrap();

        let conn = Connection::open(&path).unwrap();
        let (email, enable): (String, i64) = conn
            .query_row(
                "SELECT email, enable FROM clients WHERE inbound_id = 1 AND uuid = 'A'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(email, "a@x.com");
        assert_eq!(enable, 1);
    }
}
