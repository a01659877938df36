//! Lifecycle events

use platform_native::PlatformError;
use serde::Serialize;

use crate::LifecycleState;

/// An OS-facing step of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    CreateChannel,
    StartForeground,
    PostNotification,
    StopForeground,
    CancelNotification,
    AcquireWakeLock,
    ReleaseWakeLock,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateChannel => "create_channel",
            Self::StartForeground => "start_foreground",
            Self::PostNotification => "post_notification",
            Self::StopForeground => "stop_foreground",
            Self::CancelNotification => "cancel_notification",
            Self::AcquireWakeLock => "acquire_wake_lock",
            Self::ReleaseWakeLock => "release_wake_lock",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step that the platform refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: Step,
    pub error: PlatformError,
}

/// Lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Entered the active state
    Activated,
    /// Returned to the inactive state
    Deactivated,
    /// Notification content replaced
    NotificationUpdated,
    /// Notification hidden by a silent update
    NotificationHidden,
    /// A platform step failed; the transition carried on
    StepFailed(StepFailure),
}

/// Outcome of a single controller call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionReport {
    pub from: LifecycleState,
    pub to: LifecycleState,
    /// False when the call was a no-op
    pub applied: bool,
    pub failures: Vec<StepFailure>,
}

impl TransitionReport {
    pub(crate) fn noop(state: LifecycleState) -> Self {
        Self {
            from: state,
            to: state,
            applied: false,
            failures: Vec::new(),
        }
    }

    /// Applied with no failed steps
    pub fn is_clean(&self) -> bool {
        self.applied && self.failures.is_empty()
    }

    pub fn failed(&self, step: Step) -> bool {
        self.failures.iter().any(|f| f.step == step)
    }
}
