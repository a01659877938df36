//! Host-facing background mode switch
//!
//! Maps the host application's lifecycle callbacks onto the controller:
//! pausing the app activates background mode if the user enabled it,
//! resuming or destroying the app deactivates it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use serde_json::Value;
use settings::{ConfigStore, Configuration, LayerPriority, SettingsLayer};

use crate::{LifecycleController, TransitionReport};

/// What the OS should do with the background worker after killing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Recreate the worker once resources allow
    Sticky,
    /// Leave it stopped
    NotSticky,
}

/// Background mode
pub struct BackgroundMode {
    controller: Arc<LifecycleController>,
    store: RwLock<ConfigStore>,
    enabled: AtomicBool,
    in_background: AtomicBool,
}

impl BackgroundMode {
    /// Starts disabled and in the foreground.
    pub fn new(controller: Arc<LifecycleController>) -> Self {
        Self {
            controller,
            store: RwLock::new(ConfigStore::new()),
            enabled: AtomicBool::new(false),
            in_background: AtomicBool::new(false),
        }
    }

    pub fn controller(&self) -> &Arc<LifecycleController> {
        &self.controller
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_in_background(&self) -> bool {
        self.in_background.load(Ordering::SeqCst)
    }

    /// Effective configuration
    pub fn settings(&self) -> Configuration {
        self.store.read().resolve()
    }

    /// Arm background mode. Activates right away if the app is already in
    /// the background.
    pub fn enable(&self) -> Option<TransitionReport> {
        let was_enabled = self.enabled.swap(true, Ordering::SeqCst);
        if was_enabled || !self.is_in_background() {
            return None;
        }
        Some(self.controller.activate(&self.settings()))
    }

    /// Disarm background mode, deactivating if needed.
    pub fn disable(&self) -> TransitionReport {
        self.enabled.store(false, Ordering::SeqCst);
        self.controller.deactivate()
    }

    /// Replace the host defaults used for the next activation.
    ///
    /// Non-object payloads are ignored and the previous defaults kept.
    pub fn set_defaults(&self, defaults: &Value) {
        let mut layer = SettingsLayer::new(LayerPriority::Defaults);
        if let Err(err) = layer.merge(defaults) {
            tracing::warn!("Ignoring host defaults: {}", err);
            return;
        }
        self.store.write().replace_layer(layer);
    }

    /// Merge runtime settings. With `update`, a shown notification is
    /// refreshed right away.
    pub fn configure(&self, overrides: &Value, update: bool) -> Option<TransitionReport> {
        self.store.write().apply(overrides, LayerPriority::Runtime);
        if !update || !self.controller.is_active() {
            return None;
        }
        Some(self.controller.update_notification(&self.settings()))
    }

    /// The app moved to the background.
    pub fn on_pause(&self) -> Option<TransitionReport> {
        self.in_background.store(true, Ordering::SeqCst);
        if !self.is_enabled() {
            tracing::debug!("Background mode disabled, not keeping the app awake");
            return None;
        }
        Some(self.controller.activate(&self.settings()))
    }

    /// The app is visible again.
    pub fn on_resume(&self) -> TransitionReport {
        self.in_background.store(false, Ordering::SeqCst);
        self.controller.deactivate()
    }

    /// The app is being torn down.
    pub fn on_destroy(&self) -> TransitionReport {
        self.controller.deactivate()
    }

    pub fn restart_policy(&self) -> RestartPolicy {
        RestartPolicy::Sticky
    }
}
