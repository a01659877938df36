//! Configuration to descriptor

use std::sync::Arc;

use platform_native::{PlatformInfo, ResourceCategory, ResourceId, ResourceResolver};
use settings::{Configuration, DEFAULT_TITLE};

use crate::{
    Argb, CHANNEL_ID, NOTIFICATION_ID, NotificationDescriptor, Priority, Style, TapAction,
    Visibility,
};

/// Name of the application's own launcher icon
pub const APP_ICON: &str = "icon";

/// Turns a [`Configuration`] into a [`NotificationDescriptor`].
///
/// Building never fails: every malformed or missing input degrades to a
/// default.
#[derive(Clone)]
pub struct NotificationBuilder {
    resources: Arc<dyn ResourceResolver>,
    platform: PlatformInfo,
}

impl NotificationBuilder {
    pub fn new(resources: Arc<dyn ResourceResolver>, platform: PlatformInfo) -> Self {
        Self { resources, platform }
    }

    pub fn platform(&self) -> PlatformInfo {
        self.platform
    }

    pub fn build(&self, config: &Configuration) -> NotificationDescriptor {
        let title = if config.title.trim().is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            config.title.clone()
        };
        let text = config.text.clone();

        let (priority, visibility) = if config.hidden {
            (Priority::Min, Visibility::Secret)
        } else {
            (Priority::Default, Visibility::Public)
        };

        let style = if config.big_text || text.contains('\n') {
            Style::BigText(text.clone())
        } else {
            Style::Plain
        };

        let tap_action = if config.resume {
            let target = self.resources.launch_entry();
            if target.is_none() {
                tracing::debug!("Host has no launch entry, notification will not resume");
            }
            target.map(|t| TapAction::resume(t, NOTIFICATION_ID))
        } else {
            None
        };

        NotificationDescriptor {
            channel_id: self
                .platform
                .supports_notification_channels()
                .then(|| CHANNEL_ID.to_string()),
            title,
            text,
            icon: self.resolve_icon(&config.icon),
            color: self.resolve_color(config.color.as_deref()),
            priority,
            visibility,
            style,
            tap_action,
            ongoing: true,
        }
    }

    /// Look `name` up under each icon category, then the application's own
    /// icon, then the platform default.
    pub fn resolve_icon(&self, name: &str) -> ResourceId {
        let candidates = [name, APP_ICON];
        for candidate in candidates.iter().filter(|n| !n.is_empty()) {
            for category in ResourceCategory::ICON_ORDER {
                if let Some(id) = self.resources.resolve(candidate, category) {
                    if *candidate != name {
                        tracing::debug!(icon = name, fallback = candidate, "Icon not found, using fallback");
                    }
                    return id;
                }
            }
        }

        tracing::debug!(icon = name, "No icon resource found, using platform default");
        self.resources.default_icon()
    }

    fn resolve_color(&self, hex: Option<&str>) -> Option<Argb> {
        let hex = hex?;
        if !self.platform.supports_notification_color() {
            return None;
        }

        let color = Argb::from_hex(hex);
        if color.is_none() {
            tracing::warn!(color = hex, "Ignoring invalid notification color");
        }
        color
    }
}
