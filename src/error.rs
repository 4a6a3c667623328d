//! Error taxonomy for the merge engine.
//!
//! Everything crosses the engine boundary as a value; user-facing phrasing is the
//! caller's problem. Schema and validation failures are detected before any
//! mutation and fail closed. Execution failures keep the driver's diagnostic
//! verbatim. Finalization failures never imply a rolled-back merge.

use std::fmt;

/// The database's shape does not match what the chosen mode needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No `inbounds` table; this is not a panel database at all.
    NotAnInboundsDatabase,
    /// A `clients` table exists but carries no copyable column.
    NoClientsTable,
    /// No recognized settings column on the `inbounds` table.
    NoSettingsColumn,
    /// TABLE mode requires a `uuid` identity column on `clients`.
    NoUuidColumn,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::NotAnInboundsDatabase => {
                write!(f, "database has no inbounds table")
            }
            SchemaError::NoClientsTable => {
                write!(f, "clients table has no usable columns")
            }
            SchemaError::NoSettingsColumn => {
                write!(f, "inbounds table has no recognized settings column")
            }
            SchemaError::NoUuidColumn => {
                write!(f, "clients table has no uuid column")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// The request referenced ids that do not hold up against the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Target id must be positive.
    InvalidTarget(i64),
    /// Source ids must be positive.
    InvalidSources(Vec<i64>),
    /// At least one source inbound is required.
    NoSources,
    /// The target inbound does not exist.
    TargetNotFound(i64),
    /// Every missing source id, reported together so the operator can fix
    /// them all in one round trip.
    SourceNotFound(Vec<i64>),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidTarget(id) => {
                write!(f, "target inbound id must be positive, got {}", id)
            }
            ValidationError::InvalidSources(ids) => {
                write!(f, "source inbound ids must be positive, got {}", join_ids(ids))
            }
            ValidationError::NoSources => write!(f, "no source inbounds given"),
            ValidationError::TargetNotFound(id) => {
                write!(f, "target inbound {} not found", id)
            }
            ValidationError::SourceNotFound(ids) => {
                write!(f, "source inbounds not found: {}", join_ids(ids))
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Top-level merge failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    Schema(SchemaError),
    Validation(ValidationError),
    /// Failure while applying the merge; the target is unchanged and the
    /// original diagnostic is preserved.
    Execution(String),
    /// Failure while packaging the standalone output file; the merge commit
    /// itself stands.
    Finalization(String),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::Schema(e) => write!(f, "schema error: {}", e),
            MergeError::Validation(e) => write!(f, "validation error: {}", e),
            MergeError::Execution(msg) => write!(f, "execution error: {}", msg),
            MergeError::Finalization(msg) => write!(f, "finalization error: {}", msg),
        }
    }
}

impl std::error::Error for MergeError {}

impl From<SchemaError> for MergeError {
    fn from(e: SchemaError) -> Self {
        MergeError::Schema(e)
    }
}

impl From<ValidationError> for MergeError {
    fn from(e: ValidationError) -> Self {
        MergeError::Validation(e)
    }
}

impl From<rusqlite::Error> for MergeError {
    fn from(e: rusqlite::Error) -> Self {
        MergeError::Execution(e.to_string())
    }
}

pub(crate) fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}
