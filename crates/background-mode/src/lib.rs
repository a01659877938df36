//! # Background Mode
//!
//! Keeps an application process alive while it has no visible UI: the
//! background worker is put into the foreground state, with the persistent
//! notification that requires, and a partial wake-lock is held until the
//! app comes back.
//!
//! The OS services are reached through the traits of `platform-native` and
//! `notifications`; the host bundles its implementations into a
//! [`Platform`] and hands a [`LifecycleController`] to whoever needs it.

pub mod controller;
pub mod event;
pub mod headless;
pub mod mode;

use std::sync::Arc;

use notifications::{ForegroundService, NotificationManager};
use platform_native::{PlatformInfo, PowerManager, ResourceResolver};

pub use controller::{LifecycleController, LifecycleState, WAKE_LOCK_TAG};
pub use event::{LifecycleEvent, Step, StepFailure, TransitionReport};
pub use headless::HeadlessPlatform;
pub use mode::{BackgroundMode, RestartPolicy};

/// The OS services the controller drives.
#[derive(Clone)]
pub struct Platform {
    pub foreground: Arc<dyn ForegroundService>,
    pub notifications: Arc<dyn NotificationManager>,
    pub power: Arc<dyn PowerManager>,
    pub resources: Arc<dyn ResourceResolver>,
    pub info: PlatformInfo,
}
