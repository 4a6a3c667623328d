//! Package a mutated working copy into a clean standalone file.
//!
//! The emitted file must open on its own: no pending WAL frames, no `-wal` or
//! `-shm` sidecars, defragmented. `VACUUM INTO` does all three in one step;
//! older SQLite builds without it get an in-place `VACUUM` plus a plain file
//! copy instead.

use std::fs;
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use crate::error::MergeError;

/// Write a self-contained copy of `working` to `output`. The working copy is
/// left behind for the caller to discard; a pre-existing output file is
/// replaced.
pub(crate) fn finalize_into(working: &Path, output: &Path) -> Result<(), MergeError> {
    if output.exists() {
        fs::remove_file(output).map_err(|e| {
            MergeError::Finalization(format!("cannot replace {}: {}", output.display(), e))
        })?;
    }

    let conn = Connection::open_with_flags(
        working,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| MergeError::Finalization(e.to_string()))?;

    // Fold any WAL frames into the main file, then drop sidecar dependence
    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
        .map_err(|e| MergeError::Finalization(e.to_string()))?;
    conn.pragma_update(None, "journal_mode", "DELETE")
        .map_err(|e| MergeError::Finalization(e.to_string()))?;

    let output_str = output.to_string_lossy().into_owned();
    match conn.execute("VACUUM INTO ?1", [output_str.as_str()]) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::warn!(
                "[Finalize] VACUUM INTO failed ({}), falling back to compact-and-copy",
                e
            );
            if output.exists() {
                // A partial output may have been left behind
                let _ = fs::remove_file(output);
            }
            conn.execute_batch("VACUUM;")
                .map_err(|e| MergeError::Finalization(e.to_string()))?;
            drop(conn);
            fs::copy(working, output).map_err(|e| {
                MergeError::Finalization(format!("copy to {}: {}", output.display(), e))
            })?;
            Ok(())
        }
    }
}
