//! Notification data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Channel every local/test notification goes through unless the caller
/// picks another one
pub const DEFAULT_CHANNEL_ID: &str = "default-channel-id";

/// Outcome of the platform permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushPermission {
    /// User has not been asked yet
    NotDetermined,
    Granted,
    Denied,
}

impl PushPermission {
    pub fn is_granted(&self) -> bool {
        matches!(self, PushPermission::Granted)
    }
}

/// A single notification, local or remote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    /// Free-form payload attached by the sender
    pub data: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(title: String, body: String, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            channel_id: DEFAULT_CHANNEL_ID.to_string(),
            title,
            body,
            data,
            received_at: Utc::now(),
        }
    }

    pub fn with_channel(mut self, channel_id: String) -> Self {
        self.channel_id = channel_id;
        self
    }
}

/// Android-style channel registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Platform importance level, 1 (min) to 4 (high)
    pub importance: u8,
}

impl Default for ChannelSpec {
    fn default() -> Self {
        Self {
            id: DEFAULT_CHANNEL_ID.to_string(),
            name: "Default channel".to_string(),
            description: "A default channel for notifications".to_string(),
            importance: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_defaults() {
        let n = Notification::new(
            "Hello".to_string(),
            "World".to_string(),
            serde_json::json!({ "k": "v" }),
        );

        assert_eq!(n.channel_id, DEFAULT_CHANNEL_ID);
        assert_eq!(n.title, "Hello");
        assert_eq!(n.data["k"], "v");
        assert!(!n.id.is_empty());
    }

    #[test]
    fn test_permission_states() {
        assert!(PushPermission::Granted.is_granted());
        assert!(!PushPermission::Denied.is_granted());
        assert!(!PushPermission::NotDetermined.is_granted());
    }
}
