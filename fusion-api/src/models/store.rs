//! Store-level models: cache entries and history pages

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// TTL cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub cache_key: String,
    /// Opaque payload, returned as stored
    pub data: Value,
    /// Expiry, epoch seconds
    pub ttl: i64,
    /// Creation time, epoch milliseconds
    pub created_at: i64,
}

impl CacheEntry {
    /// Whether the entry is past its expiry at `now_ms`
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        fusion_common::time::is_expired(self.ttl, now_ms)
    }
}

/// The two append-only history collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCollection {
    Fusion,
    Custom,
}

impl HistoryCollection {
    /// Backing table name
    pub fn table_name(self) -> &'static str {
        match self {
            HistoryCollection::Fusion => "fusion_history",
            HistoryCollection::Custom => "custom_history",
        }
    }

    /// Map the `type` query parameter; anything but `custom` selects fusion
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("custom") => HistoryCollection::Custom,
            _ => HistoryCollection::Fusion,
        }
    }
}

/// One page of history, newest first
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub items: Vec<Value>,
    /// Number of records in the whole collection
    pub total: u64,
    pub has_next: bool,
}
