//! JSON-mode merge: clients live in a `clients` array inside each inbound's
//! settings blob.
//!
//! This strategy favors availability over strictness. A missing, NULL, or
//! unparseable blob degrades to an empty object and the merge keeps going;
//! only the final write can fail. The asymmetry with the relational
//! strategy's hard schema checks is deliberate: settings blobs in the wild
//! are frequently hand-edited.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::config;
use crate::db::inbounds::quote_ident;
use crate::db::Database;
use crate::error::MergeError;
use crate::merge::key::client_key;
use crate::models::{DedupKey, MergeMode, MergeResult};

impl Database {
    /// Append unseen source clients to the target's `clients` array and write
    /// the whole settings object back in a single UPDATE. The target's
    /// pre-existing order is preserved exactly; new clients append in
    /// source-then-record order.
    pub(crate) fn merge_embedded_json(
        &self,
        target_id: i64,
        source_ids: &[i64],
        settings_column: &str,
    ) -> Result<MergeResult, MergeError> {
        let priority = config::dedup_keys();

        let mut target_settings = self.load_settings(settings_column, target_id)?;
        let mut clients: Vec<Value> = match target_settings.get("clients") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        let before = clients.len() as u64;

        let mut seen: HashSet<DedupKey> = clients
            .iter()
            .filter(|c| c.is_object())
            .map(|c| client_key(c, &priority))
            .collect();

        let mut added: u64 = 0;
        for &source_id in source_ids {
            let source_settings = self.load_settings(settings_column, source_id)?;
            let source_clients = match source_settings.get("clients") {
                Some(Value::Array(items)) => items,
                _ => continue,
            };
            for client in source_clients {
                if !client.is_object() {
                    continue;
                }
                let key = client_key(client, &priority);
                if seen.contains(&key) {
                    continue;
                }
                clients.push(client.clone());
                seen.insert(key);
                added += 1;
            }
        }

        let after = clients.len() as u64;
        target_settings.insert("clients".to_string(), Value::Array(clients));
        let serialized = Value::Object(target_settings).to_string();

        let sql = format!(
            "UPDATE inbounds SET {} = ?1 WHERE id = ?2",
            quote_ident(settings_column)
        );
        {
            let mut conn = self.conn();
            let tx = conn.transaction()?;
            tx.execute(&sql, rusqlite::params![serialized, target_id])?;
            tx.commit()?;
        }

        Ok(MergeResult {
            mode: MergeMode::Json,
            added,
            before,
            after,
        })
    }

    /// Parse an inbound's settings blob, degrading to an empty object on
    /// absence or malformed JSON.
    fn load_settings(
        &self,
        settings_column: &str,
        inbound_id: i64,
    ) -> Result<Map<String, Value>, MergeError> {
        let text = match self.settings_text(settings_column, inbound_id)? {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(Map::new()),
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Ok(Map::new()),
            Err(e) => {
                log::warn!(
                    "[Merge] inbound {} settings blob is not valid JSON ({}), treating as empty",
                    inbound_id,
                    e
                );
                Ok(Map::new())
            }
        }
    }
}
