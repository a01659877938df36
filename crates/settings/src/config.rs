//! Background mode configuration record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default title of the background notification
pub const DEFAULT_TITLE: &str = "App is running";

/// Default text of the background notification
pub const DEFAULT_TEXT: &str = "";

/// Default icon name of the background notification
pub const DEFAULT_ICON: &str = "default";

/// Immutable snapshot of the background mode settings.
///
/// Field names on the wire follow the bridge's camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    /// Notification title
    pub title: String,
    /// Notification body
    pub text: String,
    /// Icon resource name
    pub icon: String,
    /// Accent color as hex (`RRGGBB`)
    pub color: Option<String>,
    /// Keep alive without a visible notification
    pub silent: bool,
    /// Minimum priority / visibility
    pub hidden: bool,
    /// Force long-form rendering
    pub big_text: bool,
    /// Tapping the notification brings the app back
    pub resume: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            text: DEFAULT_TEXT.to_string(),
            icon: DEFAULT_ICON.to_string(),
            color: None,
            silent: false,
            hidden: true,
            big_text: false,
            resume: false,
        }
    }
}

impl Configuration {
    /// Build from a bridge payload.
    ///
    /// Never fails: a non-object payload, a missing key or a value of the
    /// wrong type each fall back to the default for that field.
    pub fn from_json(value: &Value) -> Self {
        let empty = Map::new();
        let obj = match value.as_object() {
            Some(obj) => obj,
            None => {
                if !value.is_null() {
                    tracing::debug!("Ignoring non-object configuration payload");
                }
                &empty
            }
        };

        let defaults = Self::default();
        Self {
            title: opt_string(obj, "title").unwrap_or(defaults.title),
            text: opt_string(obj, "text").unwrap_or(defaults.text),
            icon: opt_string(obj, "icon").unwrap_or(defaults.icon),
            color: opt_string(obj, "color").filter(|c| !c.is_empty()),
            silent: opt_bool(obj, "silent").unwrap_or(defaults.silent),
            hidden: opt_bool(obj, "hidden").unwrap_or(defaults.hidden),
            big_text: opt_bool(obj, "bigText").unwrap_or(defaults.big_text),
            resume: opt_bool(obj, "resume").unwrap_or(defaults.resume),
        }
    }

    /// To JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = icon.to_string();
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn big_text(mut self, big_text: bool) -> Self {
        self.big_text = big_text;
        self
    }

    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }
}

/// Strings, numbers and booleans are accepted and stringified.
fn opt_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            tracing::debug!(key, value = %other, "Ignoring non-string setting");
            None
        }
    }
}

/// Booleans and the strings "true"/"false" (any case) are accepted.
fn opt_bool(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    match obj.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        other => {
            tracing::debug!(key, value = %other, "Ignoring non-boolean setting");
            None
        }
    }
}
