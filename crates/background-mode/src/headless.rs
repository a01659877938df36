//! In-memory platform
//!
//! Implements every OS service in memory and records the calls it receives.
//! Failures can be injected per operation to exercise degraded platforms.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use notifications::{
    ForegroundService, NotificationChannel, NotificationDescriptor, NotificationId,
    NotificationManager,
};
use parking_lot::RwLock;
use platform_native::{
    LaunchTarget, PlatformError, PlatformInfo, PlatformResult, PowerManager, ResourceCategory,
    ResourceId, ResourceResolver, WakeLockHandle,
};

use crate::Platform;

/// Icon every platform ships with
pub const SYSTEM_ICON: ResourceId = ResourceId(0x0108_0093);

/// Platform operation, for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateChannel,
    StartForeground,
    StopForeground,
    Notify,
    Cancel,
    AcquireWakeLock,
    ReleaseWakeLock,
}

/// A recorded platform call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    CreateChannel(String),
    StartForeground(NotificationId),
    StopForeground,
    Notify(NotificationId),
    Cancel(NotificationId),
    AcquireWakeLock(String),
    ReleaseWakeLock(u64),
}

#[derive(Default)]
struct HeadlessState {
    calls: Vec<PlatformCall>,
    failures: HashMap<Operation, PlatformError>,
    channels: Vec<NotificationChannel>,
    foreground_id: Option<NotificationId>,
    posted: HashMap<NotificationId, NotificationDescriptor>,
    held_locks: HashSet<u64>,
    acquisitions: usize,
    releases: usize,
    icons: HashMap<(String, ResourceCategory), ResourceId>,
    launch: Option<LaunchTarget>,
}

/// Headless platform
pub struct HeadlessPlatform {
    info: PlatformInfo,
    state: RwLock<HeadlessState>,
    next_lock_id: AtomicU64,
}

impl HeadlessPlatform {
    pub fn new(info: PlatformInfo) -> Self {
        Self {
            info,
            state: RwLock::new(HeadlessState::default()),
            next_lock_id: AtomicU64::new(1),
        }
    }

    /// Bundle this platform behind every service seam.
    pub fn platform(self: &Arc<Self>) -> Platform {
        Platform {
            foreground: self.clone(),
            notifications: self.clone(),
            power: self.clone(),
            resources: self.clone(),
            info: self.info,
        }
    }

    pub fn with_icon(self, name: &str, category: ResourceCategory, id: ResourceId) -> Self {
        self.state.write().icons.insert((name.to_string(), category), id);
        self
    }

    pub fn with_launch_entry(self, target: LaunchTarget) -> Self {
        self.state.write().launch = Some(target);
        self
    }

    /// Make `operation` fail until [`recover`](Self::recover) is called.
    pub fn fail(&self, operation: Operation, error: PlatformError) {
        self.state.write().failures.insert(operation, error);
    }

    pub fn recover(&self, operation: Operation) {
        self.state.write().failures.remove(&operation);
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state.read().calls.clone()
    }

    pub fn count_calls(&self, matches: impl Fn(&PlatformCall) -> bool) -> usize {
        self.state.read().calls.iter().filter(|c| matches(c)).count()
    }

    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.state.read().channels.clone()
    }

    /// Notification currently shown under `id`
    pub fn notification(&self, id: NotificationId) -> Option<NotificationDescriptor> {
        self.state.read().posted.get(&id).cloned()
    }

    pub fn visible_notifications(&self) -> usize {
        self.state.read().posted.len()
    }

    pub fn in_foreground(&self) -> bool {
        self.state.read().foreground_id.is_some()
    }

    pub fn held_wake_locks(&self) -> usize {
        self.state.read().held_locks.len()
    }

    pub fn wake_lock_acquisitions(&self) -> usize {
        self.state.read().acquisitions
    }

    pub fn wake_lock_releases(&self) -> usize {
        self.state.read().releases
    }

    fn enter(&self, operation: Operation, call: PlatformCall) -> PlatformResult<parking_lot::RwLockWriteGuard<'_, HeadlessState>> {
        tracing::trace!(?call, "Headless platform call");
        let mut state = self.state.write();
        state.calls.push(call);
        if let Some(err) = state.failures.get(&operation).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

impl NotificationManager for HeadlessPlatform {
    fn create_channel(&self, channel: &NotificationChannel) -> PlatformResult<()> {
        if !self.info.supports_notification_channels() {
            return Err(PlatformError::Unsupported {
                feature: "notification channels",
                api_level: self.info.api_level,
            });
        }

        let mut state = self.enter(Operation::CreateChannel, PlatformCall::CreateChannel(channel.id.clone()))?;
        if !state.channels.iter().any(|c| c.id == channel.id) {
            state.channels.push(channel.clone());
        }
        Ok(())
    }

    fn notify(&self, id: NotificationId, descriptor: &NotificationDescriptor) -> PlatformResult<()> {
        let mut state = self.enter(Operation::Notify, PlatformCall::Notify(id))?;
        state.posted.insert(id, descriptor.clone());
        Ok(())
    }

    fn cancel(&self, id: NotificationId) -> PlatformResult<()> {
        let mut state = self.enter(Operation::Cancel, PlatformCall::Cancel(id))?;
        state.posted.remove(&id);
        Ok(())
    }
}

impl ForegroundService for HeadlessPlatform {
    fn start_foreground(&self, id: NotificationId, descriptor: &NotificationDescriptor) -> PlatformResult<()> {
        let mut state = self.enter(Operation::StartForeground, PlatformCall::StartForeground(id))?;
        state.foreground_id = Some(id);
        state.posted.insert(id, descriptor.clone());
        Ok(())
    }

    fn stop_foreground(&self, remove_notification: bool) -> PlatformResult<()> {
        let mut state = self.enter(Operation::StopForeground, PlatformCall::StopForeground)?;
        if let Some(id) = state.foreground_id.take() {
            if remove_notification {
                state.posted.remove(&id);
            }
        }
        Ok(())
    }
}

impl PowerManager for HeadlessPlatform {
    fn acquire_wake_lock(&self, tag: &str) -> PlatformResult<WakeLockHandle> {
        let mut state = self.enter(Operation::AcquireWakeLock, PlatformCall::AcquireWakeLock(tag.to_string()))?;
        let id = self.next_lock_id.fetch_add(1, Ordering::Relaxed);
        state.held_locks.insert(id);
        state.acquisitions += 1;
        Ok(WakeLockHandle::new(id, tag))
    }

    fn release_wake_lock(&self, handle: WakeLockHandle) -> PlatformResult<()> {
        let mut state = self.enter(Operation::ReleaseWakeLock, PlatformCall::ReleaseWakeLock(handle.id()))?;
        if !state.held_locks.remove(&handle.id()) {
            return Err(PlatformError::CallFailed(format!("wake lock {} is not held", handle.id())));
        }
        state.releases += 1;
        Ok(())
    }
}

impl ResourceResolver for HeadlessPlatform {
    fn resolve(&self, name: &str, category: ResourceCategory) -> Option<ResourceId> {
        self.state.read().icons.get(&(name.to_string(), category)).copied()
    }

    fn default_icon(&self) -> ResourceId {
        SYSTEM_ICON
    }

    fn launch_entry(&self) -> Option<LaunchTarget> {
        self.state.read().launch.clone()
    }
}
