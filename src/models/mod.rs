//! Shared model types for the merge engine.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One row of the `inbounds` table, as much of it as the operator console needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundSummary {
    pub id: i64,
    pub port: i64,
    pub remark: Option<String>,
}

/// Which storage representation the database uses for client records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageMode {
    /// Dedicated `clients` table owning rows per inbound.
    Table,
    /// `clients` array embedded in each inbound's settings blob.
    Json { settings_column: String },
}

impl StorageMode {
    pub fn merge_mode(&self) -> MergeMode {
        match self {
            StorageMode::Table => MergeMode::Table,
            StorageMode::Json { .. } => MergeMode::Json,
        }
    }
}

/// Storage mode tag carried on a merge result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MergeMode {
    Table,
    Json,
}

impl MergeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeMode::Table => "TABLE",
            MergeMode::Json => "JSON",
        }
    }
}

/// A merge order: pull clients from `source_ids` into `target_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    pub target_id: i64,
    pub source_ids: Vec<i64>,
}

impl MergeRequest {
    pub fn new(target_id: i64, source_ids: Vec<i64>) -> Self {
        Self { target_id, source_ids }
    }

    /// Shape check: ids positive, at least one source. Runs before the
    /// database file is even opened.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.target_id <= 0 {
            return Err(ValidationError::InvalidTarget(self.target_id));
        }
        if self.source_ids.is_empty() {
            return Err(ValidationError::NoSources);
        }
        let bad: Vec<i64> = self.source_ids.iter().copied().filter(|id| *id <= 0).collect();
        if !bad.is_empty() {
            return Err(ValidationError::InvalidSources(bad));
        }
        Ok(())
    }
}

/// Outcome of one merge call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    pub mode: MergeMode,
    /// Client records newly attached to the target.
    pub added: u64,
    /// Target's client count before the merge.
    pub before: u64,
    /// Target's client count after the merge.
    pub after: u64,
}

/// Identity of one client record, used to decide whether two records are the
/// same client. `kind` names the attribute the value came from ("raw" for the
/// canonical-serialization fallback).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub kind: String,
    pub value: String,
}
