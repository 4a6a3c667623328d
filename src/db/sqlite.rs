//! Database handle for a panel SQLite file.

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::MergeError;

/// Wraps one exclusive connection to a panel database. The engine is
/// synchronous per call; callers serialize concurrent merges themselves.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open an existing database file. Deliberately opened without CREATE so a
    /// mistyped path fails instead of materializing an empty database.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self, MergeError> {
        let conn = Connection::open_with_flags(
            db_path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}
