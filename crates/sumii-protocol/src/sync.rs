//! Delta sync wire shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SyncRequest {
    /// High-watermark from the client's prior sync; absent means full sync.
    pub last_synced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResponse {
    pub server_time: DateTime<Utc>,
    pub is_full_sync: bool,
    pub conversations: Vec<Value>,
    pub messages: Vec<Value>,
    pub documents: Vec<Value>,
    pub summaries: Vec<Value>,
    pub notifications: Vec<Value>,
    pub lawyer_connections: Vec<Value>,
    /// Present for protocol completeness; soft-delete is out of scope for
    /// this core, so this is always empty.
    pub deleted_ids: HashMap<String, Vec<String>>,
}

impl SyncResponse {
    pub fn empty(server_time: DateTime<Utc>, is_full_sync: bool) -> Self {
        Self {
            server_time,
            is_full_sync,
            conversations: Vec::new(),
            messages: Vec::new(),
            documents: Vec::new(),
            summaries: Vec::new(),
            notifications: Vec::new(),
            lawyer_connections: Vec::new(),
            deleted_ids: HashMap::new(),
        }
    }
}
