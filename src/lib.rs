//! Inbound-client merge engine for x-ui style panel databases.
//!
//! Consolidates client records scattered across several source inbounds into one
//! target inbound, in whichever of the two storage representations the panel
//! uses: a dedicated `clients` table, or a `clients` array embedded in each
//! inbound's JSON settings blob. The engine is a plain library over a local
//! database path; locating the file on a remote host and shipping results back
//! is the transport's job, not ours.

pub mod config;
pub mod db;
pub mod error;
pub mod merge;
pub mod models;
pub mod report;

pub use db::Database;
pub use error::{MergeError, SchemaError, ValidationError};
pub use merge::{merge, merge_to_file};
pub use models::{DedupKey, InboundSummary, MergeMode, MergeRequest, MergeResult, StorageMode};
