//! Native platform abstractions for background mode.
//!
//! This crate provides the OS-level seams the keep-alive core calls into:
//! power management (wake-locks), resource lookup, and the capability level
//! of the running platform. Implementations live with the host.

pub mod power;
pub mod resources;

use serde::{Deserialize, Serialize};

pub use power::{PowerManager, WakeLockHandle};
pub use resources::{LaunchTarget, ResourceCategory, ResourceId, ResourceResolver};

/// Result of an OS-facing call.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Failure of an OS-facing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("{feature} is not supported on API level {api_level}")]
    Unsupported { feature: &'static str, api_level: u32 },
    #[error("Platform call failed: {0}")]
    CallFailed(String),
}

/// Platform information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// OS API level of the running device
    pub api_level: u32,
}

impl PlatformInfo {
    /// First API level that can tint notifications.
    pub const COLOR_API_LEVEL: u32 = 21;
    /// First API level that requires notification channels.
    pub const CHANNELS_API_LEVEL: u32 = 26;

    pub fn new(api_level: u32) -> Self {
        Self { api_level }
    }

    pub fn supports_notification_color(&self) -> bool {
        self.api_level >= Self::COLOR_API_LEVEL
    }

    pub fn supports_notification_channels(&self) -> bool {
        self.api_level >= Self::CHANNELS_API_LEVEL
    }
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self::new(34)
    }
}
