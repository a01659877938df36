//! Awake/asleep state machine
//!
//! The controller owns the wake-lock and the foreground notification. Every
//! OS call may fail; a failed step is logged and reported, and the
//! transition carries on with the next step.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use notifications::{NOTIFICATION_ID, NotificationBuilder, NotificationChannel};
use parking_lot::Mutex;
use platform_native::{PlatformError, WakeLockHandle};
use settings::Configuration;
use telemetry::{LogEntry, Logger};

use crate::{LifecycleEvent, Platform, Step, StepFailure, TransitionReport};

/// Tag of the partial wake-lock held while active
pub const WAKE_LOCK_TAG: &str = "backgroundmode:wakelock";

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No foreground privilege, no wake-lock, no notification
    Inactive,
    /// Foreground privilege and wake-lock held
    Active,
}

struct Inner {
    state: LifecycleState,
    wake_lock: Option<WakeLockHandle>,
    foreground: bool,
    /// Foreground left because of a silent update
    hidden_by_update: bool,
    notification_visible: bool,
    channel_ready: bool,
}

/// Lifecycle controller
pub struct LifecycleController {
    platform: Platform,
    builder: NotificationBuilder,
    inner: Mutex<Inner>,
    journal: Option<Arc<Logger>>,
    subscribers: Mutex<Vec<Sender<LifecycleEvent>>>,
}

impl LifecycleController {
    pub fn new(platform: Platform) -> Self {
        Self::build(platform, None)
    }

    /// Also record failed steps in `journal`.
    pub fn with_journal(platform: Platform, journal: Arc<Logger>) -> Self {
        Self::build(platform, Some(journal))
    }

    fn build(platform: Platform, journal: Option<Arc<Logger>>) -> Self {
        let builder = NotificationBuilder::new(Arc::clone(&platform.resources), platform.info);
        let controller = Self {
            platform,
            builder,
            inner: Mutex::new(Inner {
                state: LifecycleState::Inactive,
                wake_lock: None,
                foreground: false,
                hidden_by_update: false,
                notification_visible: false,
                channel_ready: false,
            }),
            journal,
            subscribers: Mutex::new(Vec::new()),
        };

        {
            let mut inner = controller.inner.lock();
            let mut failures = Vec::new();
            controller.ensure_channel(&mut inner, &mut failures);
        }

        controller
    }

    pub fn state(&self) -> LifecycleState {
        self.inner.lock().state
    }

    pub fn is_active(&self) -> bool {
        self.state() == LifecycleState::Active
    }

    pub fn holds_wake_lock(&self) -> bool {
        self.inner.lock().wake_lock.is_some()
    }

    pub fn in_foreground(&self) -> bool {
        self.inner.lock().foreground
    }

    pub fn notification_visible(&self) -> bool {
        self.inner.lock().notification_visible
    }

    pub fn channel_ready(&self) -> bool {
        self.inner.lock().channel_ready
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> Receiver<LifecycleEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Inactive → Active: show the notification (unless silent), enter the
    /// foreground and acquire the wake-lock. No-op while already active.
    pub fn activate(&self, config: &Configuration) -> TransitionReport {
        let mut inner = self.inner.lock();
        if inner.state == LifecycleState::Active {
            tracing::debug!("Background mode already active");
            return TransitionReport::noop(LifecycleState::Active);
        }

        let mut failures = Vec::new();

        if config.silent {
            tracing::debug!("Silent mode, skipping foreground notification");
        } else {
            self.ensure_channel(&mut inner, &mut failures);
            let descriptor = self.builder.build(config);
            match self.platform.foreground.start_foreground(NOTIFICATION_ID, &descriptor) {
                Ok(()) => {
                    inner.foreground = true;
                    inner.notification_visible = true;
                }
                Err(err) => self.record(&mut failures, Step::StartForeground, err),
            }
        }

        match self.platform.power.acquire_wake_lock(WAKE_LOCK_TAG) {
            Ok(handle) => inner.wake_lock = Some(handle),
            Err(err) => self.record(&mut failures, Step::AcquireWakeLock, err),
        }

        inner.state = LifecycleState::Active;
        tracing::info!(
            silent = config.silent,
            wake_lock = inner.wake_lock.is_some(),
            failed_steps = failures.len(),
            "Background mode activated"
        );
        self.emit(LifecycleEvent::Activated);

        TransitionReport {
            from: LifecycleState::Inactive,
            to: LifecycleState::Active,
            applied: true,
            failures,
        }
    }

    /// Active → Inactive: leave the foreground, cancel the notification and
    /// release the wake-lock. No-op while inactive.
    pub fn deactivate(&self) -> TransitionReport {
        let mut inner = self.inner.lock();
        if inner.state == LifecycleState::Inactive {
            tracing::debug!("Background mode already inactive");
            return TransitionReport::noop(LifecycleState::Inactive);
        }

        let mut failures = Vec::new();

        if let Err(err) = self.platform.foreground.stop_foreground(true) {
            self.record(&mut failures, Step::StopForeground, err);
        }
        inner.foreground = false;
        inner.hidden_by_update = false;

        if let Err(err) = self.platform.notifications.cancel(NOTIFICATION_ID) {
            self.record(&mut failures, Step::CancelNotification, err);
        }
        inner.notification_visible = false;

        // The handle is consumed either way; a failed release is not retried.
        if let Some(handle) = inner.wake_lock.take() {
            if let Err(err) = self.platform.power.release_wake_lock(handle) {
                self.record(&mut failures, Step::ReleaseWakeLock, err);
            }
        }

        inner.state = LifecycleState::Inactive;
        tracing::info!(failed_steps = failures.len(), "Background mode deactivated");
        self.emit(LifecycleEvent::Deactivated);

        TransitionReport {
            from: LifecycleState::Active,
            to: LifecycleState::Inactive,
            applied: true,
            failures,
        }
    }

    /// Replace the notification content while active.
    ///
    /// A silent configuration hides the notification but keeps the
    /// wake-lock. Ignored while inactive.
    pub fn update_notification(&self, config: &Configuration) -> TransitionReport {
        let mut inner = self.inner.lock();
        if inner.state == LifecycleState::Inactive {
            tracing::debug!("Ignoring notification update while inactive");
            return TransitionReport::noop(LifecycleState::Inactive);
        }

        let mut failures = Vec::new();

        if config.silent {
            if let Err(err) = self.platform.foreground.stop_foreground(true) {
                self.record(&mut failures, Step::StopForeground, err);
            }
            if inner.foreground {
                inner.hidden_by_update = true;
            }
            inner.foreground = false;
            inner.notification_visible = false;
            self.emit(LifecycleEvent::NotificationHidden);
        } else {
            self.ensure_channel(&mut inner, &mut failures);
            let descriptor = self.builder.build(config);
            if inner.hidden_by_update {
                // Only a silent update may bring the foreground state back;
                // a failed start waits for the next activation.
                match self.platform.foreground.start_foreground(NOTIFICATION_ID, &descriptor) {
                    Ok(()) => {
                        inner.foreground = true;
                        inner.hidden_by_update = false;
                        inner.notification_visible = true;
                    }
                    Err(err) => self.record(&mut failures, Step::StartForeground, err),
                }
            } else {
                match self.platform.notifications.notify(NOTIFICATION_ID, &descriptor) {
                    Ok(()) => inner.notification_visible = true,
                    Err(err) => self.record(&mut failures, Step::PostNotification, err),
                }
            }
            self.emit(LifecycleEvent::NotificationUpdated);
        }

        TransitionReport {
            from: LifecycleState::Active,
            to: LifecycleState::Active,
            applied: true,
            failures,
        }
    }

    /// Register the notification channel once, on platforms that need one.
    fn ensure_channel(&self, inner: &mut Inner, failures: &mut Vec<StepFailure>) {
        if inner.channel_ready {
            return;
        }
        if !self.platform.info.supports_notification_channels() {
            inner.channel_ready = true;
            return;
        }

        match self.platform.notifications.create_channel(&NotificationChannel::background_mode()) {
            Ok(()) => inner.channel_ready = true,
            Err(err) => self.record(failures, Step::CreateChannel, err),
        }
    }

    fn record(&self, failures: &mut Vec<StepFailure>, step: Step, error: PlatformError) {
        tracing::warn!(step = step.as_str(), "Background mode step failed: {}", error);

        if let Some(journal) = &self.journal {
            journal.log(
                LogEntry::warn(format!("{} failed: {}", step, error))
                    .with_target(module_path!())
                    .with_field("step", step.as_str()),
            );
        }

        let failure = StepFailure { step, error };
        self.emit(LifecycleEvent::StepFailed(failure.clone()));
        failures.push(failure);
    }

    fn emit(&self, event: LifecycleEvent) {
        // Drop subscribers whose receiver is gone.
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        if self.is_active() {
            self.deactivate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessPlatform, Operation, PlatformCall};
    use notifications::{CHANNEL_ID, Priority};
    use platform_native::PlatformInfo;
    use telemetry::LogLevel;

    fn setup() -> (Arc<HeadlessPlatform>, LifecycleController) {
        setup_with(HeadlessPlatform::new(PlatformInfo::default()))
    }

    fn setup_with(headless: HeadlessPlatform) -> (Arc<HeadlessPlatform>, LifecycleController) {
        let headless = Arc::new(headless);
        let controller = LifecycleController::new(headless.platform());
        (headless, controller)
    }

    fn denied() -> PlatformError {
        PlatformError::PermissionDenied("test".to_string())
    }

    #[test]
    fn test_starts_inactive_with_channel_ready() {
        let (headless, controller) = setup();
        assert_eq!(controller.state(), LifecycleState::Inactive);
        assert!(controller.channel_ready());
        assert_eq!(headless.channels().len(), 1);
        assert_eq!(headless.channels()[0].id, CHANNEL_ID);
        assert!(!controller.holds_wake_lock());
    }

    #[test]
    fn test_no_channel_on_old_platform() {
        let (headless, controller) = setup_with(HeadlessPlatform::new(PlatformInfo::new(23)));
        assert!(controller.channel_ready());
        assert!(headless.calls().is_empty());
    }

    #[test]
    fn test_activate_shows_notification_and_holds_lock() {
        let (headless, controller) = setup();
        let report = controller.activate(&Configuration::default().with_title("Syncing"));

        assert!(report.is_clean());
        assert_eq!(report.to, LifecycleState::Active);
        assert!(controller.holds_wake_lock());
        assert!(controller.notification_visible());
        assert!(headless.in_foreground());
        assert_eq!(headless.held_wake_locks(), 1);
        assert_eq!(headless.notification(NOTIFICATION_ID).unwrap().title, "Syncing");
        assert!(headless.calls().contains(&PlatformCall::AcquireWakeLock(WAKE_LOCK_TAG.to_string())));
    }

    #[test]
    fn test_activate_twice_acquires_once() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default());
        let second = controller.activate(&Configuration::default());

        assert!(!second.applied);
        assert_eq!(headless.wake_lock_acquisitions(), 1);
        assert_eq!(headless.count_calls(|c| matches!(c, PlatformCall::StartForeground(_))), 1);
        assert_eq!(headless.visible_notifications(), 1);
    }

    #[test]
    fn test_deactivate_while_inactive_is_noop() {
        let (headless, controller) = setup();
        let calls_before = headless.calls().len();

        let report = controller.deactivate();
        assert!(!report.applied);
        assert!(report.failures.is_empty());
        assert_eq!(headless.calls().len(), calls_before);
    }

    #[test]
    fn test_silent_activation_holds_lock_without_notification() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default().silent(true));

        assert!(controller.is_active());
        assert!(controller.holds_wake_lock());
        assert!(!controller.notification_visible());
        assert_eq!(headless.visible_notifications(), 0);
        assert!(!headless.in_foreground());
        assert_eq!(headless.held_wake_locks(), 1);
    }

    #[test]
    fn test_silent_update_hides_notification_keeps_lock() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default());
        let report = controller.update_notification(&Configuration::default().silent(true));

        assert!(report.is_clean());
        assert!(controller.is_active());
        assert!(controller.holds_wake_lock());
        assert!(!controller.notification_visible());
        assert_eq!(headless.visible_notifications(), 0);
        assert_eq!(headless.held_wake_locks(), 1);
    }

    #[test]
    fn test_update_replaces_in_place() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default());
        controller.update_notification(&Configuration::default().with_title("Step 2").hidden(false));

        assert_eq!(headless.visible_notifications(), 1);
        let shown = headless.notification(NOTIFICATION_ID).unwrap();
        assert_eq!(shown.title, "Step 2");
        assert_eq!(shown.priority, Priority::Default);
        assert_eq!(headless.count_calls(|c| *c == PlatformCall::Notify(NOTIFICATION_ID)), 1);
    }

    #[test]
    fn test_update_after_silent_update_restores_foreground() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default());
        controller.update_notification(&Configuration::default().silent(true));
        controller.update_notification(&Configuration::default().with_title("Back"));

        assert!(controller.in_foreground());
        assert!(headless.in_foreground());
        assert_eq!(headless.notification(NOTIFICATION_ID).unwrap().title, "Back");
        assert_eq!(headless.count_calls(|c| matches!(c, PlatformCall::StartForeground(_))), 2);
    }

    #[test]
    fn test_update_after_failed_start_only_reposts() {
        let (headless, controller) = setup();
        headless.fail(Operation::StartForeground, denied());
        controller.activate(&Configuration::default());
        headless.recover(Operation::StartForeground);

        let report = controller.update_notification(&Configuration::default().with_text("tick"));
        assert!(report.is_clean());
        assert!(!controller.in_foreground());
        assert!(controller.notification_visible());
        assert_eq!(headless.count_calls(|c| matches!(c, PlatformCall::StartForeground(_))), 1);
        assert_eq!(headless.count_calls(|c| *c == PlatformCall::Notify(NOTIFICATION_ID)), 1);
        assert_eq!(headless.notification(NOTIFICATION_ID).unwrap().text, "tick");
    }

    #[test]
    fn test_silent_update_after_silent_activation_then_update_reposts() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default().silent(true));
        controller.update_notification(&Configuration::default().silent(true));
        controller.update_notification(&Configuration::default());

        assert_eq!(headless.count_calls(|c| matches!(c, PlatformCall::StartForeground(_))), 0);
        assert_eq!(headless.count_calls(|c| *c == PlatformCall::Notify(NOTIFICATION_ID)), 1);
    }

    #[test]
    fn test_update_while_inactive_is_ignored() {
        let (headless, controller) = setup();
        let calls_before = headless.calls().len();

        let report = controller.update_notification(&Configuration::default());
        assert!(!report.applied);
        assert_eq!(headless.calls().len(), calls_before);
        assert_eq!(headless.visible_notifications(), 0);
    }

    #[test]
    fn test_deactivate_cleans_up_after_updates() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default());
        for i in 0..5 {
            controller.update_notification(&Configuration::default().with_text(&format!("tick {i}")));
        }
        controller.update_notification(&Configuration::default().silent(true));
        controller.update_notification(&Configuration::default());
        let report = controller.deactivate();

        assert!(report.is_clean());
        assert_eq!(controller.state(), LifecycleState::Inactive);
        assert!(!controller.holds_wake_lock());
        assert!(!controller.in_foreground());
        assert!(!controller.notification_visible());
        assert!(!headless.in_foreground());
        assert_eq!(headless.visible_notifications(), 0);
        assert_eq!(headless.held_wake_locks(), 0);
        assert_eq!(headless.wake_lock_releases(), 1);
    }

    #[test]
    fn test_failed_foreground_does_not_block_wake_lock() {
        let (headless, controller) = setup();
        headless.fail(Operation::StartForeground, denied());

        let report = controller.activate(&Configuration::default());
        assert!(report.applied);
        assert!(report.failed(Step::StartForeground));
        assert!(controller.is_active());
        assert!(controller.holds_wake_lock());
        assert!(!controller.notification_visible());
    }

    #[test]
    fn test_failed_wake_lock_still_activates_and_can_deactivate() {
        let (headless, controller) = setup();
        headless.fail(Operation::AcquireWakeLock, denied());

        let report = controller.activate(&Configuration::default());
        assert!(report.failed(Step::AcquireWakeLock));
        assert!(controller.is_active());
        assert!(!controller.holds_wake_lock());

        let report = controller.deactivate();
        assert!(report.is_clean());
        assert_eq!(headless.count_calls(|c| matches!(c, PlatformCall::ReleaseWakeLock(_))), 0);

        // A later activation tries again.
        headless.recover(Operation::AcquireWakeLock);
        controller.activate(&Configuration::default());
        assert!(controller.holds_wake_lock());
    }

    #[test]
    fn test_failing_teardown_still_releases_everything() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default());
        headless.fail(Operation::StopForeground, denied());
        headless.fail(Operation::Cancel, denied());

        let report = controller.deactivate();
        assert!(report.failed(Step::StopForeground));
        assert!(report.failed(Step::CancelNotification));
        assert_eq!(controller.state(), LifecycleState::Inactive);
        assert!(!controller.holds_wake_lock());
        assert_eq!(headless.held_wake_locks(), 0);
    }

    #[test]
    fn test_failed_release_clears_handle() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default());
        headless.fail(Operation::ReleaseWakeLock, denied());

        let report = controller.deactivate();
        assert!(report.failed(Step::ReleaseWakeLock));
        assert!(!controller.holds_wake_lock());

        headless.recover(Operation::ReleaseWakeLock);
        controller.deactivate();
        assert_eq!(headless.count_calls(|c| matches!(c, PlatformCall::ReleaseWakeLock(_))), 1);
    }

    #[test]
    fn test_channel_retried_before_first_post() {
        let headless = Arc::new(HeadlessPlatform::new(PlatformInfo::default()));
        headless.fail(Operation::CreateChannel, denied());
        let controller = LifecycleController::new(headless.platform());
        assert!(!controller.channel_ready());

        headless.recover(Operation::CreateChannel);
        controller.activate(&Configuration::default());
        assert!(controller.channel_ready());

        controller.update_notification(&Configuration::default());
        assert_eq!(headless.count_calls(|c| matches!(c, PlatformCall::CreateChannel(_))), 2);
    }

    #[test]
    fn test_events_and_journal_report_failures() {
        let headless = Arc::new(HeadlessPlatform::new(PlatformInfo::default()));
        let journal = Arc::new(Logger::new(LogLevel::Info, 32));
        let controller = LifecycleController::with_journal(headless.platform(), Arc::clone(&journal));
        let events = controller.subscribe();

        headless.fail(Operation::AcquireWakeLock, denied());
        controller.activate(&Configuration::default());

        let received: Vec<_> = events.try_iter().collect();
        assert_eq!(
            received,
            vec![
                LifecycleEvent::StepFailed(StepFailure { step: Step::AcquireWakeLock, error: denied() }),
                LifecycleEvent::Activated,
            ]
        );
        assert_eq!(journal.len(), 1);
        assert_eq!(journal.recent(1)[0].fields["step"], "acquire_wake_lock");
    }

    #[test]
    fn test_drop_releases_wake_lock() {
        let (headless, controller) = setup();
        controller.activate(&Configuration::default());
        drop(controller);

        assert_eq!(headless.held_wake_locks(), 0);
        assert!(!headless.in_foreground());
    }

    #[test]
    fn test_concurrent_calls_keep_invariants() {
        let (headless, controller) = setup();
        let controller = Arc::new(controller);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let controller = Arc::clone(&controller);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        if i % 2 == 0 {
                            controller.activate(&Configuration::default());
                        } else {
                            controller.deactivate();
                        }
                        controller.update_notification(&Configuration::default());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        controller.deactivate();
        assert_eq!(headless.held_wake_locks(), 0);
        assert_eq!(headless.wake_lock_acquisitions(), headless.wake_lock_releases());
        assert_eq!(headless.visible_notifications(), 0);
    }
}
