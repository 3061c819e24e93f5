//! Persisted sync state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable record of sync progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Cursor of the last committed page
    #[serde(default)]
    pub last_cursor: Option<String>,
    /// When the record was written
    pub updated_at: DateTime<Utc>,
}

impl SyncState {
    /// A record for `cursor`, stamped now
    pub fn new(last_cursor: Option<String>) -> Self {
        Self {
            last_cursor,
            updated_at: Utc::now(),
        }
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Export as pretty-printed JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
