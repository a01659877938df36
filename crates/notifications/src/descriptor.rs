//! Persistent status descriptor

use platform_native::{LaunchTarget, ResourceId};
use serde::{Deserialize, Serialize};

use crate::{Argb, NotificationId};

/// Notification priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Min,
    Low,
    Default,
}

/// Lock-screen visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Secret,
    Private,
    Public,
}

/// Rendering style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Style {
    /// Single line of text
    Plain,
    /// Expanded long-form text
    BigText(String),
}

/// What happens when the notification is tapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapAction {
    /// Entry point to bring to the front
    pub target: LaunchTarget,
    /// Request code the pending action is registered under
    pub request_code: NotificationId,
    /// Drop every activity above the target
    pub clear_top: bool,
    /// Reuse the target if it is already on top
    pub single_top: bool,
    /// Replace an already registered pending action
    pub update_current: bool,
}

impl TapAction {
    /// Relaunch the host's main entry, clearing any intermediate stack.
    pub fn resume(target: LaunchTarget, request_code: NotificationId) -> Self {
        Self {
            target,
            request_code,
            clear_top: true,
            single_top: true,
            update_current: true,
        }
    }
}

/// Rendered content of the persistent notification.
///
/// Built fresh for every configuration; never edited after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDescriptor {
    /// Channel, on platforms that have them
    pub channel_id: Option<String>,
    pub title: String,
    pub text: String,
    pub icon: ResourceId,
    pub color: Option<Argb>,
    pub priority: Priority,
    pub visibility: Visibility,
    pub style: Style,
    pub tap_action: Option<TapAction>,
    /// Cannot be swiped away
    pub ongoing: bool,
}

impl NotificationDescriptor {
    pub fn is_big_text(&self) -> bool {
        matches!(self.style, Style::BigText(_))
    }
}
