//! Single-line result protocol.
//!
//! When the engine runs as a binary invoked by the remote-execution
//! collaborator, the collaborator relays exactly one stdout line and the exit
//! code back to the console. Success lines and the original error tokens
//! (`ERR_NO_CLIENTS_TABLE`, `ERR_NO_UUID`, `ERR_NO_SETTINGS_COL`) are kept
//! stable so existing relays parse them unchanged.

use crate::error::{join_ids, MergeError, SchemaError, ValidationError};
use crate::models::MergeResult;

/// `OK_MODE=<TABLE|JSON> OK_ADDED=<n> BEFORE=<n> AFTER=<n>`
pub fn success_line(result: &MergeResult) -> String {
    format!(
        "OK_MODE={} OK_ADDED={} BEFORE={} AFTER={}",
        result.mode.as_str(),
        result.added,
        result.before,
        result.after
    )
}

/// `ERR_<REASON>` token for one failure; missing source ids ride along as
/// `ERR_SOURCE_NOT_FOUND=<id,id,…>`.
pub fn error_line(error: &MergeError) -> String {
    match error {
        MergeError::Schema(SchemaError::NotAnInboundsDatabase) => "ERR_NOT_INBOUNDS_DB".into(),
        MergeError::Schema(SchemaError::NoClientsTable) => "ERR_NO_CLIENTS_TABLE".into(),
        MergeError::Schema(SchemaError::NoUuidColumn) => "ERR_NO_UUID".into(),
        MergeError::Schema(SchemaError::NoSettingsColumn) => "ERR_NO_SETTINGS_COL".into(),
        MergeError::Validation(ValidationError::TargetNotFound(_)) => "ERR_TARGET_NOT_FOUND".into(),
        MergeError::Validation(ValidationError::SourceNotFound(ids)) => {
            format!("ERR_SOURCE_NOT_FOUND={}", join_ids(ids))
        }
        MergeError::Validation(_) => "ERR_BAD_REQUEST".into(),
        MergeError::Execution(_) => "ERR_EXEC".into(),
        MergeError::Finalization(_) => "ERR_FINALIZE".into(),
    }
}

/// Process exit code for one failure. Codes 11, 12 and 20 predate this crate
/// and must not move.
pub fn exit_code(error: &MergeError) -> i32 {
    match error {
        MergeError::Validation(ValidationError::TargetNotFound(_)) => 21,
        MergeError::Validation(ValidationError::SourceNotFound(_)) => 22,
        MergeError::Validation(_) => 2,
        MergeError::Schema(SchemaError::NoClientsTable) => 11,
        MergeError::Schema(SchemaError::NoUuidColumn) => 12,
        MergeError::Schema(SchemaError::NotAnInboundsDatabase) => 14,
        MergeError::Schema(SchemaError::NoSettingsColumn) => 20,
        MergeError::Execution(_) => 30,
        MergeError::Finalization(_) => 31,
    }
}
