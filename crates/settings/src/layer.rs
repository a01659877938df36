//! Settings layers

use std::path::Path;
use serde_json::{Map, Value};

use crate::ConfigError;

/// Layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerPriority {
    /// Defaults supplied by the host application
    Defaults = 10,
    /// Runtime overrides sent while the app is running
    Runtime = 20,
}

/// A settings layer
#[derive(Debug, Clone)]
pub struct SettingsLayer {
    pub priority: LayerPriority,
    values: Map<String, Value>,
}

impl SettingsLayer {
    pub fn new(priority: LayerPriority) -> Self {
        Self {
            priority,
            values: Map::new(),
        }
    }

    /// Load from file
    pub fn from_file(path: &Path, priority: LayerPriority) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, priority)
    }

    /// Load from JSON string
    pub fn from_json(json: &str, priority: LayerPriority) -> Result<Self, ConfigError> {
        // Handle JSON with comments (JSONC)
        let clean_json = strip_json_comments(json);
        let value: Value = serde_json::from_str(&clean_json)?;

        let mut layer = Self::new(priority);
        layer.merge(&value)?;
        Ok(layer)
    }

    /// Copy every key of a JSON object into this layer
    pub fn merge(&mut self, json: &Value) -> Result<(), ConfigError> {
        let obj = json.as_object().ok_or(ConfigError::NotAnObject)?;
        for (key, val) in obj {
            self.set(key, val.clone());
        }
        Ok(())
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a value
    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Count of settings
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// To JSON value
    pub fn to_json(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

/// Strip comments from JSONC
fn strip_json_comments(json: &str) -> String {
    let mut result = String::with_capacity(json.len());
    let mut chars = json.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(c) = chars.next() {
        if escape {
            result.push(c);
            escape = false;
            continue;
        }

        if c == '\\' && in_string {
            result.push(c);
            escape = true;
            continue;
        }

        if c == '"' {
            in_string = !in_string;
            result.push(c);
            continue;
        }

        if !in_string && c == '/' {
            match chars.peek() {
                Some('/') => {
                    // Line comment - skip until newline
                    while chars.peek().is_some_and(|&ch| ch != '\n') {
                        chars.next();
                    }
                    continue;
                }
                Some('*') => {
                    // Block comment - skip until */
                    chars.next();
                    let mut prev = ' ';
                    for ch in chars.by_ref() {
                        if prev == '*' && ch == '/' {
                            break;
                        }
                        prev = ch;
                    }
                    continue;
                }
                _ => {}
            }
        }

        result.push(c);
    }

    result
}

/// Merge multiple layers into one object, later layers winning
pub fn merge_layers(layers: &[SettingsLayer]) -> Map<String, Value> {
    let mut result = Map::new();

    for layer in layers {
        for (key, value) in &layer.values {
            result.insert(key.clone(), value.clone());
        }
    }

    result
}
