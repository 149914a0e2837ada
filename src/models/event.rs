//! Broadcast payloads and REST query responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /api/channels/{channel}/broadcast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub event: String,
    /// Plain payload, or the JSON text of an encrypted envelope.
    pub data: Value,
}

/// Per-channel outcome of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    pub channel: String,
    pub result: bool,
}

/// `GET /api/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub users_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /api/channels`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelList {
    pub rooms: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /api/channels/{channel}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelUsersCount {
    pub users_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /api/channels/{channel}/users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelUsers {
    pub users: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
