//! Notification channels

use serde::{Deserialize, Serialize};

/// Channel the background notification is posted to
pub const CHANNEL_ID: &str = "cordova-plugin-background-mode-id";

/// Channel importance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    Min,
    Low,
    Default,
    High,
}

/// Notification channel definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub id: String,
    /// User-visible name
    pub name: String,
    /// User-visible description
    pub description: String,
    pub importance: Importance,
}

impl NotificationChannel {
    /// The channel used for the keep-alive notification.
    pub fn background_mode() -> Self {
        Self {
            id: CHANNEL_ID.to_string(),
            name: CHANNEL_ID.to_string(),
            description: format!("{} notification", CHANNEL_ID),
            importance: Importance::Low,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_mode_channel() {
        let channel = NotificationChannel::background_mode();
        assert_eq!(channel.id, CHANNEL_ID);
        assert_eq!(channel.name, CHANNEL_ID);
        assert_eq!(channel.description, "cordova-plugin-background-mode-id notification");
        assert_eq!(channel.importance, Importance::Low);
    }
}
