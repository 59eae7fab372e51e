//! Request DTOs for the diagnostics and webhook API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::invalidation::{ChangeKind, DataChange};

/// Row-change payload posted by a database webhook (POST /webhooks/rows)
///
/// Accepts both the `type`/`record`/`old_record` and the
/// `eventType`/`new`/`old` field spellings.
#[derive(Debug, Clone, Deserialize)]
pub struct RowChangeWebhook {
    /// INSERT, UPDATE or DELETE
    #[serde(rename = "type", alias = "eventType", default)]
    pub kind: ChangeKind,
    /// Table the row belongs to
    pub table: String,
    /// Row after the change (absent for deletes)
    #[serde(default, alias = "new")]
    pub record: Option<Value>,
    /// Row before the change (absent for inserts)
    #[serde(default, alias = "old")]
    pub old_record: Option<Value>,
}

impl RowChangeWebhook {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.table.trim().is_empty() {
            return Some("Table cannot be empty".to_string());
        }
        None
    }

    /// Reads a string column from the new row, falling back to the old one.
    fn column(&self, name: &str) -> Option<String> {
        [self.record.as_ref(), self.old_record.as_ref()]
            .into_iter()
            .flatten()
            .find_map(|row| row.get(name).and_then(Value::as_str))
            .map(str::to_string)
    }

    pub fn into_change(self) -> DataChange {
        DataChange {
            workspace_id: self.column("workspace_id"),
            user_id: self.column("user_id"),
            kind: self.kind,
            resource: self.table,
        }
    }
}
