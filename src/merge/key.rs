//! Dedup identity for JSON-mode client records.

use serde_json::Value;

use crate::models::DedupKey;

/// Compute the identity of one client record. Walks `priority` (attribute
/// names, best first) and takes the first string value with non-empty trimmed
/// content. Records with none of the attributes fall back to a canonical
/// serialization, so structurally identical records collide no matter how
/// their attributes are ordered. Total: never fails, even on `{}` or a
/// non-object value.
pub fn client_key(record: &Value, priority: &[String]) -> DedupKey {
    if let Value::Object(map) = record {
        for attr in priority {
            if let Some(Value::String(s)) = map.get(attr.as_str()) {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    return DedupKey {
                        kind: attr.clone(),
                        value: trimmed.to_string(),
                    };
                }
            }
        }
    }
    DedupKey {
        kind: "raw".to_string(),
        value: canonical_json(record),
    }
}

/// Serialize with object keys sorted at every depth. Array order is data and
/// stays as-is.
pub fn canonical_json(value: &Value) -> String {
    sort_keys(value).to_string()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<(&String, &Value)> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = serde_json::Map::new();
            for (k, v) in pairs {
                sorted.insert(k.clone(), sort_keys(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
