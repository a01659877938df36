//! # Background Mode Notifications
//!
//! The persistent status notification that foreground privilege requires:
//! the descriptor, the builder that derives it from a configuration, and the
//! OS services that post it.

pub mod builder;
pub mod channel;
pub mod color;
pub mod descriptor;

use platform_native::PlatformResult;

pub use builder::{APP_ICON, NotificationBuilder};
pub use channel::{CHANNEL_ID, Importance, NotificationChannel};
pub use color::Argb;
pub use descriptor::{NotificationDescriptor, Priority, Style, TapAction, Visibility};

/// Notification ID
pub type NotificationId = i32;

/// Fixed ID for the 'foreground' notification
pub const NOTIFICATION_ID: NotificationId = -574_543_954;

/// Notification manager service
pub trait NotificationManager: Send + Sync {
    /// Register a channel. Registering an existing channel is a no-op.
    fn create_channel(&self, channel: &NotificationChannel) -> PlatformResult<()>;

    /// Post or replace the notification with `id`.
    fn notify(&self, id: NotificationId, descriptor: &NotificationDescriptor) -> PlatformResult<()>;

    /// Remove the notification with `id`.
    fn cancel(&self, id: NotificationId) -> PlatformResult<()>;
}

/// Foreground privilege of the background worker
pub trait ForegroundService: Send + Sync {
    /// Enter the foreground state, showing `descriptor` under `id`.
    fn start_foreground(&self, id: NotificationId, descriptor: &NotificationDescriptor) -> PlatformResult<()>;

    /// Leave the foreground state.
    fn stop_foreground(&self, remove_notification: bool) -> PlatformResult<()>;
}
