use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default chat room.
pub const DEFAULT_ROOM: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(alias = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Sort messages oldest first. Stable, so equal timestamps keep arrival order.
pub fn sort_by_timestamp(messages: &mut [ChatMessage]) {
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}
