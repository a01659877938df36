//! # Background Mode Settings
//!
//! The configuration record delivered by the application bridge, and a
//! layered store that merges host defaults with runtime overrides.

pub mod config;
pub mod layer;

use serde_json::Value;

pub use config::{Configuration, DEFAULT_ICON, DEFAULT_TEXT, DEFAULT_TITLE};
pub use layer::{LayerPriority, SettingsLayer, merge_layers};

/// Settings error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Settings must be a JSON object")]
    NotAnObject,
}

/// Layered configuration store.
///
/// Built-in defaults sit underneath every layer; higher priority layers
/// override lower ones key by key.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    /// Settings layers (in priority order)
    layers: Vec<SettingsLayer>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            layers: vec![
                SettingsLayer::new(LayerPriority::Defaults),
                SettingsLayer::new(LayerPriority::Runtime),
            ],
        }
    }

    /// Replace a layer wholesale
    pub fn replace_layer(&mut self, layer: SettingsLayer) {
        self.layers.retain(|l| l.priority != layer.priority);
        self.layers.push(layer);
        self.layers.sort_by_key(|l| l.priority);
    }

    /// Merge a JSON object into the layer with `priority`.
    ///
    /// Non-object payloads are ignored.
    pub fn apply(&mut self, json: &Value, priority: LayerPriority) {
        let Some(layer) = self.layers.iter_mut().find(|l| l.priority == priority) else {
            return;
        };
        if let Err(err) = layer.merge(json) {
            tracing::warn!(?priority, "Ignoring settings update: {}", err);
        }
    }

    /// Drop every value of a layer
    pub fn clear(&mut self, priority: LayerPriority) {
        self.replace_layer(SettingsLayer::new(priority));
    }

    /// Get a layer
    pub fn layer(&self, priority: LayerPriority) -> Option<&SettingsLayer> {
        self.layers.iter().find(|l| l.priority == priority)
    }

    /// Current effective configuration
    pub fn resolve(&self) -> Configuration {
        Configuration::from_json(&Value::Object(merge_layers(&self.layers)))
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_store_resolves_to_defaults() {
        assert_eq!(ConfigStore::new().resolve(), Configuration::default());
    }

    #[test]
    fn test_runtime_overrides_defaults() {
        let mut store = ConfigStore::new();
        store.apply(&json!({ "title": "Host title", "text": "Host text" }), LayerPriority::Defaults);
        store.apply(&json!({ "title": "Live title" }), LayerPriority::Runtime);

        let config = store.resolve();
        assert_eq!(config.title, "Live title");
        assert_eq!(config.text, "Host text");

        store.clear(LayerPriority::Runtime);
        assert_eq!(store.resolve().title, "Host title");
    }

    #[test]
    fn test_apply_ignores_non_objects() {
        let mut store = ConfigStore::new();
        store.apply(&json!("garbage"), LayerPriority::Runtime);
        assert!(store.layer(LayerPriority::Runtime).unwrap().is_empty());
    }

    #[test]
    fn test_replace_layer_keeps_priority_order() {
        let mut store = ConfigStore::new();
        let mut defaults = SettingsLayer::new(LayerPriority::Defaults);
        defaults.set("silent", json!(true));
        store.apply(&json!({ "silent": false }), LayerPriority::Runtime);
        store.replace_layer(defaults);

        assert!(!store.resolve().silent);
    }
}
