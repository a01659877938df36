//! `bgmode` - runs background mode against the headless platform.
//!
//! Usage: `bgmode [settings.json]`
//!
//! Loads optional host defaults, pretends the app went to the background,
//! refreshes the notification every few seconds, and returns to the
//! foreground on Ctrl-C.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossbeam_channel::Receiver;
use background_mode::{BackgroundMode, HeadlessPlatform, LifecycleController, LifecycleEvent};
use notifications::NOTIFICATION_ID;
use platform_native::{LaunchTarget, PlatformInfo};
use serde_json::json;
use settings::{LayerPriority, SettingsLayer};
use telemetry::{Logger, TelemetryConfig};

const TICK: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let telemetry = TelemetryConfig::default();
    let journal = Arc::new(Logger::from_config(&telemetry));
    journal.init(&telemetry)?;

    let defaults = match std::env::args().nth(1) {
        Some(path) => SettingsLayer::from_file(Path::new(&path), LayerPriority::Defaults)
            .with_context(|| format!("failed to load settings from {}", path))?,
        None => SettingsLayer::new(LayerPriority::Defaults),
    };

    let headless = Arc::new(HeadlessPlatform::new(PlatformInfo::default()).with_launch_entry(LaunchTarget {
        package: "dev.bgmode.demo".to_string(),
        entry: "MainActivity".to_string(),
    }));
    let controller = Arc::new(LifecycleController::with_journal(headless.platform(), Arc::clone(&journal)));
    let events = controller.subscribe();

    let mode = BackgroundMode::new(controller);
    mode.set_defaults(&defaults.to_json());
    mode.enable();

    tracing::info!("🌙 Entering background");
    mode.on_pause();
    if let Some(shown) = headless.notification(NOTIFICATION_ID) {
        tracing::info!("Notification: {}", serde_json::to_string(&shown)?);
    }

    let started = Instant::now();
    let mut ticker = tokio::time::interval(TICK);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let text = format!("Running for {}s", started.elapsed().as_secs());
                mode.configure(&json!({ "text": text }), true);
                log_failures(&events);
            }
        }
    }

    tracing::info!("☀️ Back in the foreground");
    mode.on_resume();

    log_failures(&events);
    tracing::info!(
        wake_locks_held = headless.held_wake_locks(),
        journaled_failures = journal.len(),
        "Done"
    );

    Ok(())
}

/// Drain pending lifecycle events, surfacing failed steps.
fn log_failures(events: &Receiver<LifecycleEvent>) {
    for event in events.try_iter() {
        if let LifecycleEvent::StepFailed(failure) = event {
            tracing::warn!(step = %failure.step, "Step failed during run: {}", failure.error);
        }
    }
}
