//! Merge pipeline: validation, backup, strategy dispatch.
//!
//! One call runs open, backup, probe, id validation, then exactly one
//! strategy. Everything up to the strategy's commit is read-only apart from
//! the backup copy, so a failure anywhere before the apply step leaves the
//! database exactly as it was.

pub mod finalize;
pub mod json;
pub mod key;
pub mod relational;

#[cfg(test)]
pub(crate) mod testutil;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config;
use crate::db::Database;
use crate::error::{MergeError, ValidationError};
use crate::models::{MergeRequest, MergeResult, StorageMode};

/// Merge client records from the request's source inbounds into its target,
/// mutating the database at `db_path` in place.
pub fn merge(db_path: &Path, request: &MergeRequest) -> Result<MergeResult, MergeError> {
    let backup_dir = config::backup_dir()
        .or_else(|| db_path.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    merge_with_backup_dir(db_path, request, &backup_dir)
}

/// Merge into a fresh standalone deliverable instead of mutating `db_path`.
///
/// Stages a private working copy in a scoped temp directory, merges there,
/// then packages the result to `output_path` as a self-contained single file.
/// The working copy and everything beside it are deleted on success and on
/// failure alike; the input database is never touched.
pub fn merge_to_file(
    db_path: &Path,
    request: &MergeRequest,
    output_path: &Path,
) -> Result<MergeResult, MergeError> {
    request.validate()?;

    let staging = tempfile::tempdir()
        .map_err(|e| MergeError::Execution(format!("cannot create staging dir: {}", e)))?;
    let working = staging.path().join("working.db");
    fs::copy(db_path, &working)
        .map_err(|e| MergeError::Execution(format!("cannot stage working copy: {}", e)))?;

    // Backups of the working copy land in the staging dir and vanish with it
    let result = merge_with_backup_dir(&working, request, staging.path())?;
    finalize::finalize_into(&working, output_path)?;

    log::info!(
        "[Merge] wrote standalone output {} (mode={} added={})",
        output_path.display(),
        result.mode.as_str(),
        result.added
    );
    Ok(result)
}

fn merge_with_backup_dir(
    db_path: &Path,
    request: &MergeRequest,
    backup_dir: &Path,
) -> Result<MergeResult, MergeError> {
    request.validate()?;

    let db = Database::open(db_path)?;
    backup_database(db_path, backup_dir)?;

    let mode = db.storage_mode()?;
    validate_ids(&db, request)?;

    log::info!(
        "[Merge] target={} sources={:?} mode={}",
        request.target_id,
        request.source_ids,
        mode.merge_mode().as_str()
    );

    let result = match &mode {
        StorageMode::Table => db.merge_relational(request.target_id, &request.source_ids),
        StorageMode::Json { settings_column } => {
            db.merge_embedded_json(request.target_id, &request.source_ids, settings_column)
        }
    }?;

    log::info!(
        "[Merge] done: added={} before={} after={}",
        result.added,
        result.before,
        result.after
    );
    Ok(result)
}

/// Target first, then every source; all missing sources are reported in one
/// error so the operator fixes the whole list in a single round trip.
fn validate_ids(db: &Database, request: &MergeRequest) -> Result<(), MergeError> {
    if !db.inbound_exists(request.target_id)? {
        return Err(ValidationError::TargetNotFound(request.target_id).into());
    }
    let missing = db.missing_inbounds(&request.source_ids)?;
    if !missing.is_empty() {
        return Err(ValidationError::SourceNotFound(missing).into());
    }
    Ok(())
}

/// Copy the database file aside before mutating it. Best-effort by default:
/// a failed copy logs a warning and the merge proceeds, unless strict backup
/// is configured.
fn backup_database(db_path: &Path, backup_dir: &Path) -> Result<Option<PathBuf>, MergeError> {
    let backup_path = backup_dir.join(format!("xuihub_db_backup_{}.db", Utc::now().timestamp()));
    match fs::copy(db_path, &backup_path) {
        Ok(_) => {
            log::info!("[Backup] wrote {}", backup_path.display());
            Ok(Some(backup_path))
        }
        Err(e) => {
            if config::require_backup() {
                Err(MergeError::Execution(format!(
                    "backup to {} failed: {}",
                    backup_path.display(),
                    e
                )))
            } else {
                log::warn!(
                    "[Backup] copy to {} failed ({}), continuing without backup",
                    backup_path.display(),
                    e
                );
                Ok(None)
            }
        }
    }
}
