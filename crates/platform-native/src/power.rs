//! Power management

use crate::PlatformResult;

/// A held partial wake-lock: the CPU stays awake, the screen may sleep.
///
/// Deliberately not `Clone`: releasing consumes the handle, so a lock can
/// only ever be given back once.
#[derive(Debug, PartialEq, Eq)]
pub struct WakeLockHandle {
    id: u64,
    tag: String,
}

impl WakeLockHandle {
    pub fn new(id: u64, tag: impl Into<String>) -> Self {
        Self { id, tag: tag.into() }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

/// Power manager service.
pub trait PowerManager: Send + Sync {
    /// Acquire a partial wake-lock tagged with `tag`.
    fn acquire_wake_lock(&self, tag: &str) -> PlatformResult<WakeLockHandle>;

    /// Release a previously acquired wake-lock.
    fn release_wake_lock(&self, handle: WakeLockHandle) -> PlatformResult<()>;
}
