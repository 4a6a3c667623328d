//! Environment-driven configuration for the merge engine.

use std::env;
use std::path::PathBuf;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Comma-separated candidate names for the inbound settings column,
    /// highest priority first.
    pub const SETTINGS_COLUMNS: &str = "XUIHUB_SETTINGS_COLUMNS";
    /// Comma-separated client attributes tried as the dedup identity,
    /// highest priority first.
    pub const DEDUP_KEYS: &str = "XUIHUB_DEDUP_KEYS";
    /// Directory for pre-merge backup copies (default: the database's own dir).
    pub const BACKUP_DIR: &str = "XUIHUB_BACKUP_DIR";
    /// When set to 1/true, a failed backup aborts the merge instead of
    /// proceeding with a warning.
    pub const REQUIRE_BACKUP: &str = "XUIHUB_REQUIRE_BACKUP";
}

/// Default values
pub mod defaults {
    pub const DATABASE_URL: &str = "./x-ui.db";
    pub const SETTINGS_COLUMNS: &[&str] = &["settings", "setting", "settingsJson", "settings_json"];
    pub const DEDUP_KEYS: &[&str] = &["uuid", "id", "email", "password"];
}

fn csv_list(env_var: &str, fallback: &[&str]) -> Vec<String> {
    match env::var(env_var) {
        Ok(raw) => {
            let items: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if items.is_empty() {
                fallback.iter().map(|s| s.to_string()).collect()
            } else {
                items
            }
        }
        Err(_) => fallback.iter().map(|s| s.to_string()).collect(),
    }
}

/// Candidate settings-column names, highest priority first.
pub fn settings_columns() -> Vec<String> {
    csv_list(env_vars::SETTINGS_COLUMNS, defaults::SETTINGS_COLUMNS)
}

/// Dedup-key attribute priority for JSON-mode client records.
pub fn dedup_keys() -> Vec<String> {
    csv_list(env_vars::DEDUP_KEYS, defaults::DEDUP_KEYS)
}

/// Where pre-merge backups should be written, if overridden.
pub fn backup_dir() -> Option<PathBuf> {
    env::var(env_vars::BACKUP_DIR).ok().map(PathBuf::from)
}

/// Whether a failed pre-merge backup must abort the merge.
pub fn require_backup() -> bool {
    matches!(
        env::var(env_vars::REQUIRE_BACKUP).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes")
    )
}

/// Get the database path from environment or default
pub fn database_url() -> String {
    env::var(env_vars::DATABASE_URL).unwrap_or_else(|_| defaults::DATABASE_URL.to_string())
}
